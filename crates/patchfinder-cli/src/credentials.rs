use anyhow::{bail, Context, Result};
use console::Term;
use patchfinder_core::{Credentials, DeviceTarget};

pub const USERNAME_VAR: &str = "PF_USERNAME";
pub const PASSWORD_VAR: &str = "PF_PASSWORD";

pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
    let username = lookup(USERNAME_VAR).filter(|v| !v.is_empty());
    let password = lookup(PASSWORD_VAR).filter(|v| !v.is_empty());
    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials::new(username, password)),
        _ => bail!("authentication environment variables not found ({USERNAME_VAR}, {PASSWORD_VAR})"),
    }
}

pub fn from_env() -> Result<Credentials> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Flags win, and a missing password is prompted for. A password without a
/// username is rejected. With no flags the environment is used.
pub fn resolve(term: &Term, username: Option<String>, password: Option<String>) -> Result<Credentials> {
    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials::new(username, password)),
        (Some(username), None) => {
            let password = prompt_password(term)?;
            Ok(Credentials::new(username, password))
        }
        (None, Some(_)) => bail!("--password given without --username"),
        (None, None) => from_env(),
    }
}

pub fn prompt_hosts(term: &Term) -> Result<Vec<String>> {
    term.write_line("You can enter multiple IPs separated by a space")?;
    term.write_str("[>] Enter switch IP(s): ")?;
    let hosts: Vec<String> = term
        .read_line()
        .context("failed to read switch addresses")?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if hosts.is_empty() {
        bail!("no input provided");
    }
    Ok(hosts)
}

/// Asks for credentials per host. An empty username uses the environment.
pub fn prompt_targets(term: &Term, hosts: Vec<String>) -> Result<Vec<DeviceTarget>> {
    term.write_line("Leave username empty to use environment variables")?;
    let mut targets = Vec::with_capacity(hosts.len());
    for host in hosts {
        term.write_line(&host)?;
        term.write_str("[>] Enter SSH username: ")?;
        let username = term.read_line()?.trim().to_string();
        let credentials = if username.is_empty() {
            let credentials = from_env()?;
            term.write_line(&format!(
                "[+] Switch {host} added with environment username '{}'",
                credentials.username
            ))?;
            credentials
        } else {
            let password = prompt_password(term)?;
            term.write_line(&format!("[+] Switch {host} added with username '{username}'"))?;
            Credentials::new(username, password)
        };
        targets.push(DeviceTarget::new(host, credentials));
    }
    Ok(targets)
}

pub fn wait_for_enter(term: &Term, host: &str) -> Result<()> {
    term.write_str(&format!("\nPress [ENTER] to connect to {host}"))?;
    term.read_line()?;
    Ok(())
}

pub fn confirm(term: &Term, question: &str) -> Result<bool> {
    loop {
        term.write_str(&format!("[?] {question} [y/n]: "))?;
        match term.read_line()?.trim() {
            "y" | "Y" => return Ok(true),
            "n" | "N" => return Ok(false),
            _ => continue,
        }
    }
}

fn prompt_password(term: &Term) -> Result<String> {
    term.write_str("[>] Enter SSH password: ")?;
    term.read_secure_line().context("failed to read password")
}
