use std::io;
use std::net::UdpSocket;

pub const MAX_DATAGRAM_SIZE: usize = 4096;

pub fn bind(address: &str, port: u16) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind((address, port))?;
    socket.set_nonblocking(true)?;
    info!("Listening on {}", socket.local_addr()?);
    Ok(socket)
}

/// Hands every queued datagram to `handler` until the socket would block
pub fn drain<F: FnMut(&[u8])>(socket: &UdpSocket, buffer: &mut [u8], mut handler: F) -> io::Result<()> {
    loop {
        match socket.recv(buffer) {
            Ok(size) => handler(&buffer[..size]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

mod test {
    #[test]
    fn test_drain() {
        use std::net::UdpSocket;

        use super::{bind, drain};

        let socket = bind("127.0.0.1", 0).unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"$M>", socket.local_addr().unwrap()).unwrap();
        sender.send_to(b"\x00\x01\x01", socket.local_addr().unwrap()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));

        let mut buffer = [0u8; 16];
        let mut received = Vec::new();
        drain(&socket, &mut buffer, |bytes| received.push(bytes.to_vec())).unwrap();
        assert_eq!(received, vec![b"$M>".to_vec(), b"\x00\x01\x01".to_vec()]);
    }
}
