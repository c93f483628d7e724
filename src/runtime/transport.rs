use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

/// Well-known UDPRIP listening port (spec §6).
pub const UDPRIP_PORT: u16 = 55151;

/// One message is exactly one datagram; no framing, no fragmentation
/// above this MTU (spec §6).
const RECV_BUF_SIZE: usize = 65_507;

pub struct UdpTransport {
    sock: UdpSocket,
}

impl UdpTransport {
    pub fn bind(self_address: &str) -> io::Result<Self> {
        let sock = UdpSocket::bind((self_address, UDPRIP_PORT))?;
        Ok(Self { sock })
    }

    /// Blocks for up to `timeout` waiting for one datagram. Returns
    /// `Ok(None)` on timeout so callers can interleave the periodic
    /// advertiser and shutdown checks with the receive loop.
    pub fn recv(&self, timeout: Duration) -> io::Result<Option<(Vec<u8>, SocketAddr)>> {
        self.sock.set_read_timeout(Some(timeout))?;
        let mut buf = vec![0_u8; RECV_BUF_SIZE];
        match self.sock.recv_from(&mut buf) {
            Ok((n, addr)) => {
                buf.truncate(n);
                Ok(Some((buf, addr)))
            }
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn send(&self, payload: &[u8], address: &str) -> io::Result<usize> {
        self.sock.send_to(payload, (address, UDPRIP_PORT))
    }
}
