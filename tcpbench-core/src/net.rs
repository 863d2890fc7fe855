// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! TCP connection setup: listen, accept, connect, loopback pairs.

use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use crate::error::{BenchError, BenchResult};
use crate::types::Port;

/// Bind a listener on all interfaces. Port 0 picks an ephemeral port.
pub fn listen(port: u16) -> BenchResult<TcpListener> {
    let listener =
        TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).map_err(|e| BenchError::Io {
            context: "binding acceptor",
            source: e,
        })?;
    let local = local_addr(&listener)?;
    tracing::info!(port = local.port(), "Acceptor listening");
    Ok(listener)
}

/// Bound address of a listener.
pub fn local_addr(listener: &TcpListener) -> BenchResult<SocketAddr> {
    listener.local_addr().map_err(|e| BenchError::Io {
        context: "querying local port",
        source: e,
    })
}

/// Accept exactly one connection.
pub fn accept_one(listener: &TcpListener, nodelay: bool) -> BenchResult<TcpStream> {
    let (stream, peer) = listener.accept().map_err(|e| BenchError::Io {
        context: "accept",
        source: e,
    })?;
    set_nodelay(&stream, nodelay)?;
    tracing::info!(peer = %peer, "Accepted connection");
    Ok(stream)
}

/// Connect to the first resolved address of `host` that accepts.
pub fn connect(host: &str, port: Port, nodelay: bool) -> BenchResult<TcpStream> {
    let addrs = (host, port.value())
        .to_socket_addrs()
        .map_err(|e| BenchError::Io {
            context: "resolving host",
            source: e,
        })?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                set_nodelay(&stream, nodelay)?;
                tracing::info!(addr = %addr, "Connected");
                return Ok(stream);
            }
            Err(e) => {
                tracing::debug!(addr = %addr, error = %e, "Connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(BenchError::Io {
        context: "connect",
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no address found for {}", host),
            )
        }),
    })
}

/// Two TCP streams connected to each other over the loopback interface.
pub fn connected_pair(nodelay: bool) -> BenchResult<(TcpStream, TcpStream)> {
    let listener =
        TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).map_err(|e| BenchError::Io {
            context: "binding loopback acceptor",
            source: e,
        })?;
    let addr = local_addr(&listener)?;
    let client = TcpStream::connect(addr).map_err(|e| BenchError::Io {
        context: "connecting loopback pair",
        source: e,
    })?;
    let (server, _) = listener.accept().map_err(|e| BenchError::Io {
        context: "accepting loopback pair",
        source: e,
    })?;
    set_nodelay(&client, nodelay)?;
    set_nodelay(&server, nodelay)?;
    Ok((client, server))
}

fn set_nodelay(stream: &TcpStream, nodelay: bool) -> BenchResult<()> {
    stream.set_nodelay(nodelay).map_err(|e| BenchError::Io {
        context: "setting TCP_NODELAY",
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_connected_pair() {
        let (mut client, mut server) = connected_pair(true).unwrap();
        assert!(client.nodelay().unwrap());
        client.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[test]
    fn test_listen_connect_accept() {
        let listener = listen(0).unwrap();
        let port = Port::new(local_addr(&listener).unwrap().port()).unwrap();
        let handle = std::thread::spawn(move || accept_one(&listener, true).map(|_| ()));
        let stream = connect("127.0.0.1", port, false).unwrap();
        assert!(!stream.nodelay().unwrap());
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = connect("127.0.0.1", Port::new(port).unwrap(), true);
        assert!(matches!(result, Err(BenchError::Io { context: "connect", .. })));
    }
}
