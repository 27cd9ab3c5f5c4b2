// mospfctl: interactive control CLI, talking JSON over UDP to a running
// mospfd's control listener.

use std::io::{self, Write};
use std::net::UdpSocket;

use serde_json::Value;

fn help() {
    println!("Available commands:");
    println!("  routing-table  - show the computed forwarding table");
    println!("  neighbors      - show discovered neighbors per interface");
    println!("  help           - show this message");
    println!("  exit           - quit mospfctl");
}

fn prompt(label: &str, default: &str) -> io::Result<String> {
    print!("{} [{}]: ", label, default);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() { default.to_string() } else { trimmed.to_string() })
}

fn main() -> io::Result<()> {
    let ip = prompt("Router control address", "127.0.0.1")?;
    let port = prompt("Router control port", "8902")?;
    let server_addr = format!("{}:{}", ip, port);

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(&server_addr)?;
    println!("Connected to {}", server_addr);

    println!("\nWelcome to mospfctl");
    help();

    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let command = input.trim();

        match command {
            "exit" => {
                println!("bye");
                break;
            }
            "help" | "" => {
                help();
                continue;
            }
            "routing-table" | "neighbors" => send_command(&socket, command)?,
            other => println!("unknown command: {} (try 'help')", other),
        }
    }
    Ok(())
}

fn send_command(socket: &UdpSocket, command: &str) -> io::Result<()> {
    let request = serde_json::json!({ "command": command });
    socket.send(request.to_string().as_bytes())?;

    let mut buf = [0u8; 8192];
    let len = socket.recv(&mut buf)?;
    match serde_json::from_slice::<Value>(&buf[..len]) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default()),
        Err(e) => println!("malformed response: {}", e),
    }
    Ok(())
}
