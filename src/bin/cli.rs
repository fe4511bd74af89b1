//! seeklog CLI Client
//!
//! Command-line interface for interacting with a seeklog server.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use seeklog::protocol::encode_seek_directive;
use seeklog::{Result, SeekRequest};

/// seeklog CLI
#[derive(Parser, Debug)]
#[command(name = "seeklog-cli")]
#[command(about = "CLI for the seeklog command log")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a command and print the retained log
    Send {
        /// Command text (a trailing newline is added)
        text: String,
    },

    /// Print the log starting inside a retained command
    Seek {
        /// Command index, counted from the oldest retained
        command: u32,

        /// Byte offset within that command
        offset: u32,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let request = match args.command {
        Commands::Send { text } => {
            let mut line = text.into_bytes();
            line.push(b'\n');
            line
        }
        Commands::Seek { command, offset } => encode_seek_directive(SeekRequest::new(command, offset)),
    };

    match exchange(&args.server, &request) {
        Ok(reply) => {
            let mut stdout = io::stdout().lock();
            if stdout.write_all(&reply).and_then(|_| stdout.flush()).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("seeklog-cli: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Send one request and read the reply until the server closes
fn exchange(server: &str, request: &[u8]) -> Result<Vec<u8>> {
    let mut stream = TcpStream::connect(server)?;
    stream.write_all(request)?;
    stream.flush()?;

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply)?;
    Ok(reply)
}
