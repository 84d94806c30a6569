//! Name resolution and TCP connection to the relay

use std::{
    fmt::{self, Debug, Formatter},
    io::{self, Read, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use socket2::{Domain, Protocol, Socket, Type};

use crate::transport::smtp::{error, Error};

/// Connected plain TCP stream to the relay
pub struct NetworkStream {
    inner: TcpStream,
}

impl Debug for NetworkStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkStream")
            .field("peer_addr", &self.inner.peer_addr().ok())
            .finish()
    }
}

impl NetworkStream {
    /// Resolves `host` and connects to the first IPv4 address which accepts the connection
    ///
    /// `timeout` bounds each connection attempt, `None` waits for the system limit.
    pub fn connect(host: &str, port: u16, timeout: Option<Duration>) -> Result<Self, Error> {
        let addrs = resolve(host, port)?;

        let mut last_err = None;
        for addr in addrs {
            #[cfg(feature = "tracing")]
            tracing::debug!("connecting to {}", addr);

            match try_connect(&addr, timeout) {
                Ok(inner) => return Ok(NetworkStream { inner }),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("connection to {} failed: {}", addr, err);
                    last_err = Some(err)
                }
            }
        }

        Err(match last_err {
            Some(last_err) => error::connection(last_err),
            None => error::connection("could not connect"),
        })
    }

    /// Sets the deadline for every read and write, `None` blocks
    pub fn set_timeout(&mut self, duration: Option<Duration>) -> io::Result<()> {
        self.inner.set_read_timeout(duration)?;
        self.inner.set_write_timeout(duration)
    }

    /// Returns the address of the relay
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.inner.peer_addr()
    }

    /// Shuts down both halves of the connection
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.inner.shutdown(Shutdown::Both)
    }
}

fn try_connect(addr: &SocketAddr, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    match timeout {
        Some(timeout) => socket.connect_timeout(&(*addr).into(), timeout)?,
        None => socket.connect(&(*addr).into())?,
    }
    Ok(TcpStream::from(socket))
}

/// Resolves `host` to its IPv4 socket addresses
pub fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, Error> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(error::resolution)?
        .filter(SocketAddr::is_ipv4)
        .collect();

    if addrs.is_empty() {
        return Err(error::resolution(format!("no IPv4 address for {host}")));
    }
    Ok(addrs)
}

impl Read for NetworkStream {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for NetworkStream {
    #[inline]
    fn write(&mut self, msg: &[u8]) -> io::Result<usize> {
        self.inner.write(msg)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
