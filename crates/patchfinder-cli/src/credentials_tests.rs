use std::collections::HashMap;

use console::Term;

use crate::credentials::{from_lookup, resolve, PASSWORD_VAR, USERNAME_VAR};

fn lookup_in(vars: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
    move |name| vars.get(name).map(|v| v.to_string())
}

#[test]
fn environment_credentials_need_both_variables() {
    // Arrange
    let both = HashMap::from([(USERNAME_VAR, "netops"), (PASSWORD_VAR, "secret")]);
    let user_only = HashMap::from([(USERNAME_VAR, "netops")]);
    let empty_password = HashMap::from([(USERNAME_VAR, "netops"), (PASSWORD_VAR, "")]);

    // Act
    let credentials = from_lookup(lookup_in(both)).expect("credentials");

    // Assert
    assert_eq!(credentials.username, "netops");
    assert_eq!(credentials.password, "secret");
    assert!(from_lookup(lookup_in(user_only)).is_err());
    assert!(from_lookup(lookup_in(empty_password)).is_err());
}

#[test]
fn missing_variables_are_named_in_the_error() {
    let err = from_lookup(|_| None).expect_err("no env");
    let message = err.to_string();
    assert!(message.contains(USERNAME_VAR));
    assert!(message.contains(PASSWORD_VAR));
}

#[test]
fn password_is_not_printed_in_debug_output() {
    let credentials = from_lookup(lookup_in(HashMap::from([
        (USERNAME_VAR, "netops"),
        (PASSWORD_VAR, "hunter2"),
    ])))
    .expect("credentials");
    assert!(!format!("{credentials:?}").contains("hunter2"));
}

#[test]
fn password_flag_without_username_is_rejected() {
    // Act
    let err = resolve(&Term::stdout(), None, Some("secret".to_string())).expect_err("no username");

    // Assert
    assert!(err.to_string().contains("--username"));
}

#[test]
fn both_flags_skip_the_environment() {
    let credentials = resolve(&Term::stdout(), Some("netops".to_string()), Some("secret".to_string()))
        .expect("credentials");
    assert_eq!(credentials.username, "netops");
    assert_eq!(credentials.password, "secret");
}
