use midir::{MidiInput, MidiInputConnection};
use std::sync::mpsc::Sender;
use vj_core::Command;

/// Connect every available MIDI input. Messages are forwarded unparsed to
/// the render thread; the engine does the interpretation.
pub fn connect_inputs(tx: &Sender<Command>) -> Vec<MidiInputConnection<()>> {
    let scanner = match MidiInput::new("vj-native") {
        Ok(m) => m,
        Err(e) => {
            log::warn!("[midi] unavailable: {}", e);
            return Vec::new();
        }
    };
    let port_count = scanner.ports().len();
    drop(scanner);

    let mut connections = Vec::with_capacity(port_count);
    for index in 0..port_count {
        // `connect` consumes the client, so each port gets its own.
        let Ok(input) = MidiInput::new("vj-native") else {
            continue;
        };
        let Some(port) = input.ports().into_iter().nth(index) else {
            continue;
        };
        let name = input
            .port_name(&port)
            .unwrap_or_else(|_| format!("port {}", index));
        let tx = tx.clone();
        match input.connect(
            &port,
            "vj-native-in",
            move |_stamp, bytes, _| {
                _ = tx.send(Command::Midi(bytes.to_vec()));
            },
            (),
        ) {
            Ok(conn) => {
                log::info!("[midi] connected {}", name);
                connections.push(conn);
            }
            Err(e) => log::warn!("[midi] could not connect {}: {}", name, e),
        }
    }
    if connections.is_empty() {
        log::info!("[midi] no inputs connected");
    }
    connections
}
