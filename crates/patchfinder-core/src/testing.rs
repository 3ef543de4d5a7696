use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::poller::{stats_command, HOSTNAME_COMMAND, POE_COMMAND, STATUS_COMMAND, VERSION_COMMAND};
use crate::transport::{Credentials, DeviceTarget, DeviceTransport, TransportError};

pub(crate) fn c9300_outputs() -> HashMap<String, String> {
    let fixtures = [
        (
            HOSTNAME_COMMAND.to_string(),
            include_str!("../fixtures/c9300/show_running_config_include_hostname.txt"),
        ),
        (
            VERSION_COMMAND.to_string(),
            include_str!("../fixtures/c9300/show_version.txt"),
        ),
        (
            POE_COMMAND.to_string(),
            include_str!("../fixtures/c9300/show_power_inline.txt"),
        ),
        (
            STATUS_COMMAND.to_string(),
            include_str!("../fixtures/c9300/show_interfaces_status.txt"),
        ),
        (
            stats_command("Gi0/0"),
            include_str!("../fixtures/c9300/show_interfaces_Gi0_0.txt"),
        ),
        (
            stats_command("Gi1/0/1"),
            include_str!("../fixtures/c9300/show_interfaces_Gi1_0_1.txt"),
        ),
        (
            stats_command("Gi1/0/2"),
            include_str!("../fixtures/c9300/show_interfaces_Gi1_0_2.txt"),
        ),
        (
            stats_command("Gi1/0/3"),
            include_str!("../fixtures/c9300/show_interfaces_Gi1_0_3.txt"),
        ),
        (
            stats_command("Gi1/0/4"),
            include_str!("../fixtures/c9300/show_interfaces_Gi1_0_4.txt"),
        ),
        (
            stats_command("Gi1/0/5"),
            include_str!("../fixtures/c9300/show_interfaces_Gi1_0_5.txt"),
        ),
    ];
    fixtures
        .into_iter()
        .map(|(command, output)| (command, output.to_string()))
        .collect()
}

pub(crate) fn target(host: &str) -> DeviceTarget {
    DeviceTarget::new(host, Credentials::new("netops", "secret"))
}

/// In-memory switch that answers from a command -> output table.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    pub outputs: HashMap<String, String>,
    pub refuse: HashMap<String, fn() -> TransportError>,
    pub fail_on: Option<String>,
    pub hold: Option<Arc<Notify>>,
    pub commands: Arc<Mutex<Vec<String>>>,
    pub disconnects: Arc<AtomicUsize>,
    connected: bool,
}

impl ScriptedTransport {
    pub fn with_outputs(outputs: HashMap<String, String>) -> Self {
        Self {
            outputs,
            ..Self::default()
        }
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceTransport for ScriptedTransport {
    async fn connect(&mut self, target: &DeviceTarget) -> Result<(), TransportError> {
        if let Some(make_error) = self.refuse.get(&target.host) {
            return Err(make_error());
        }
        self.connected = true;
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.commands
            .lock()
            .expect("command log")
            .push(command.to_string());
        if let Some(hold) = self.hold.take() {
            hold.notified().await;
        }
        if self.fail_on.as_deref() == Some(command) {
            return Err(TransportError::Io("connection reset by peer".to_string()));
        }
        self.outputs
            .get(command)
            .cloned()
            .ok_or_else(|| TransportError::Command {
                command: command.to_string(),
                reason: "% Invalid input detected".to_string(),
            })
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
