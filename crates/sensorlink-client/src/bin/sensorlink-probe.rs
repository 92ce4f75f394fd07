//! `sensorlink-probe` – walk the server's command surface from another
//! machine and print the raw replies.
//!
//! Usage: `sensorlink-probe [PORT] [BAUD]` (defaults `/dev/ttyUSB0`, 9600).

use std::process::ExitCode;

use sensorlink_client::{ClientError, SensorClient};

/// One deliberately unknown command to confirm the whitelist is closed.
const COMMANDS: &[&str] = &["ping", "status", "get_sensor_data", "flux_capacitor"];

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let baud = match args.next().map(|b| b.parse::<u32>()).transpose() {
        Ok(baud) => baud.unwrap_or(9600),
        Err(_) => {
            eprintln!("sensorlink-probe: BAUD must be a positive integer");
            return ExitCode::FAILURE;
        }
    };

    let mut client = match SensorClient::connect(&port, baud) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("sensorlink-probe: cannot open {port}: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("connected to {port} at {baud} baud");

    for command in COMMANDS {
        println!("--- {command}");
        match client.send_command(command) {
            Ok(value) => println!("    {value}"),
            Err(ClientError::Server(message)) => println!("    server error: {message}"),
            Err(e) => {
                eprintln!("    exchange failed: {e}");
                client.close();
                return ExitCode::FAILURE;
            }
        }
    }

    client.close();
    ExitCode::SUCCESS
}
