use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub ssh_port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            ssh_port: 22,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(30),
        }
    }
}
