use crossbeam_channel::Sender;
use log::{debug, info, warn};

use crate::error::BridgeResult;
use crate::messaging::BridgeMessage;

/// Callback invoked with each raw message from a bound input.
pub type MidiCallback = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Access to the host's MIDI inputs.
pub trait MidiInputHost {
    /// Live listener; dropping it unregisters the callback.
    type Binding;

    /// Input names in the order the host reports them.
    fn port_names(&self) -> Vec<String>;

    fn connect(&mut self, port_name: &str, callback: MidiCallback) -> BridgeResult<Self::Binding>;
}

pub enum RouterState<B> {
    Unbound,
    Bound { port: String, binding: B },
}

/// Keeps exactly one MIDI input bound: always the first one the host lists.
pub struct MidiRouter<H: MidiInputHost> {
    host: Option<H>,
    state: RouterState<H::Binding>,
    sender: Sender<BridgeMessage>,
    last_ports: Vec<String>,
}

impl<H: MidiInputHost> MidiRouter<H> {
    /// A router without a host never binds.
    pub fn new(host: Option<H>, sender: Sender<BridgeMessage>) -> Self {
        if host.is_none() {
            info!("No MIDI access; on-screen keyboard only");
        }
        Self {
            host,
            state: RouterState::Unbound,
            sender,
            last_ports: Vec::new(),
        }
    }

    /// Re-enumerate inputs and rebind if the list changed since last time.
    ///
    /// Only names are compared. A device unplugged and replugged between two
    /// polls looks unchanged and keeps its old binding; shorten
    /// `device_poll_interval_ms` if controllers are hot-swapped that quickly.
    pub fn poll(&mut self) {
        let Some(host) = self.host.as_ref() else {
            return;
        };
        let ports = host.port_names();
        if ports != self.last_ports {
            self.on_device_list_changed(ports);
        }
    }

    /// Drop the current listener, then bind the first listed input.
    pub fn on_device_list_changed(&mut self, ports: Vec<String>) {
        self.last_ports = ports;

        if let RouterState::Bound { port, binding } =
            std::mem::replace(&mut self.state, RouterState::Unbound)
        {
            drop(binding);
            debug!("Released MIDI input '{}'", port);
        }

        let Some(host) = self.host.as_mut() else {
            return;
        };
        let Some(first) = self.last_ports.first().cloned() else {
            info!("No MIDI inputs available");
            return;
        };

        let sender = self.sender.clone();
        let callback: MidiCallback = Box::new(move |bytes: &[u8]| {
            debug!("midi: {:02X?}", bytes);
            sender.send(BridgeMessage::Midi(bytes.to_vec())).ok();
        });

        match host.connect(&first, callback) {
            Ok(binding) => {
                info!("Bound MIDI input '{}'", first);
                self.state = RouterState::Bound {
                    port: first,
                    binding,
                };
            }
            Err(err) => warn!("{}", err),
        }
    }

    /// Name of the bound input, if any.
    pub fn bound_port(&self) -> Option<&str> {
        match &self.state {
            RouterState::Bound { port, .. } => Some(port.as_str()),
            RouterState::Unbound => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, RouterState::Bound { .. })
    }

    pub fn has_access(&self) -> bool {
        self.host.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crossbeam_channel::unbounded;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Listener that records its own teardown.
    struct FakeBinding {
        port: String,
        log: Log,
    }

    impl Drop for FakeBinding {
        fn drop(&mut self) {
            self.log.lock().unwrap().push(format!("close {}", self.port));
        }
    }

    #[derive(Default)]
    struct FakeHost {
        ports: Vec<String>,
        refuse: bool,
        log: Log,
        callbacks: Arc<Mutex<Vec<(String, MidiCallback)>>>,
    }

    impl MidiInputHost for FakeHost {
        type Binding = FakeBinding;

        fn port_names(&self) -> Vec<String> {
            self.ports.clone()
        }

        fn connect(&mut self, port_name: &str, callback: MidiCallback) -> BridgeResult<FakeBinding> {
            if self.refuse {
                return Err(BridgeError::MidiConnect(port_name.to_string()));
            }
            self.log.lock().unwrap().push(format!("open {}", port_name));
            self.callbacks
                .lock()
                .unwrap()
                .push((port_name.to_string(), callback));
            Ok(FakeBinding {
                port: port_name.to_string(),
                log: self.log.clone(),
            })
        }
    }

    fn ports(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn binds_first_available_input() {
        let (tx, _rx) = unbounded();
        let host = FakeHost {
            ports: ports(&["Keystation", "Launchpad"]),
            ..Default::default()
        };
        let mut router = MidiRouter::new(Some(host), tx);
        assert!(!router.is_bound());

        router.poll();
        assert_eq!(router.bound_port(), Some("Keystation"));
    }

    #[test]
    fn rebinding_closes_previous_listener_first() {
        let (tx, _rx) = unbounded();
        let host = FakeHost::default();
        let log = host.log.clone();
        let mut router = MidiRouter::new(Some(host), tx);

        router.on_device_list_changed(ports(&["A"]));
        router.on_device_list_changed(ports(&["A", "B"]));
        router.on_device_list_changed(ports(&["B"]));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["open A", "close A", "open A", "close A", "open B"]
        );
        assert_eq!(router.bound_port(), Some("B"));
    }

    #[test]
    fn empty_list_unbinds() {
        let (tx, _rx) = unbounded();
        let host = FakeHost::default();
        let log = host.log.clone();
        let mut router = MidiRouter::new(Some(host), tx);

        router.on_device_list_changed(ports(&["A"]));
        router.on_device_list_changed(Vec::new());
        assert!(!router.is_bound());
        assert_eq!(*log.lock().unwrap(), vec!["open A", "close A"]);
    }

    #[test]
    fn unchanged_list_does_not_rebind() {
        let (tx, _rx) = unbounded();
        let host = FakeHost {
            ports: ports(&["A"]),
            ..Default::default()
        };
        let log = host.log.clone();
        let mut router = MidiRouter::new(Some(host), tx);

        router.poll();
        router.poll();
        assert_eq!(*log.lock().unwrap(), vec!["open A"]);
    }

    #[test]
    fn replug_seen_by_poll_rebinds_fresh_listener() {
        let (tx, _rx) = unbounded();
        let host = FakeHost {
            ports: ports(&["A"]),
            ..Default::default()
        };
        let log = host.log.clone();
        let mut router = MidiRouter::new(Some(host), tx);
        router.poll();

        router.host.as_mut().unwrap().ports.clear();
        router.poll();
        assert!(!router.is_bound());

        router.host.as_mut().unwrap().ports = ports(&["A"]);
        router.poll();
        assert_eq!(router.bound_port(), Some("A"));
        assert_eq!(*log.lock().unwrap(), vec!["open A", "close A", "open A"]);
    }

    #[test]
    fn connect_failure_leaves_router_unbound() {
        let (tx, _rx) = unbounded();
        let host = FakeHost {
            ports: ports(&["A"]),
            refuse: true,
            ..Default::default()
        };
        let mut router = MidiRouter::new(Some(host), tx);
        router.poll();
        assert!(!router.is_bound());
    }

    #[test]
    fn without_access_never_binds() {
        let (tx, _rx) = unbounded();
        let mut router: MidiRouter<FakeHost> = MidiRouter::new(None, tx);
        router.poll();
        router.on_device_list_changed(ports(&["A"]));
        assert!(!router.is_bound());
        assert!(!router.has_access());
    }

    #[test]
    fn bound_callback_publishes_raw_bytes() {
        let (tx, rx) = unbounded();
        let host = FakeHost::default();
        let callbacks = host.callbacks.clone();
        let mut router = MidiRouter::new(Some(host), tx);
        router.on_device_list_changed(ports(&["A"]));

        let mut guard = callbacks.lock().unwrap();
        (guard[0].1)(&[0x90, 60, 100]);
        match rx.try_recv().unwrap() {
            BridgeMessage::Midi(bytes) => assert_eq!(bytes, vec![0x90, 60, 100]),
            other => panic!("unexpected message {:?}", other),
        }
    }
}
