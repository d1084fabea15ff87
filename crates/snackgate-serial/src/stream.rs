//! Links over tokio byte streams.

use std::{future::Future, io, time::Duration};

use snackgate_app::{ConnectionError, Connector, OpenError, SelectionError, Transport};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf},
    net::TcpStream,
};

use crate::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_BUFFER, DEFAULT_WRITE_TIMEOUT, SerialConfig};

/// A link over any async byte stream.
///
/// The stream is split so a pending read never blocks a write. Reads use
/// [`AsyncReadExt::read`], which is cancel-safe. A write that the peer does
/// not drain within the write timeout fails the link.
pub struct StreamTransport<S> {
    name: String,
    reader: Option<ReadHalf<S>>,
    writer: Option<WriteHalf<S>>,
    buf: Vec<u8>,
    write_timeout: Duration,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    /// Wrap `stream`, reading up to `read_buffer` bytes at a time.
    pub fn new(name: impl Into<String>, stream: S, read_buffer: usize) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            name: name.into(),
            reader: Some(reader),
            writer: Some(writer),
            buf: vec![0; read_buffer.max(1)],
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Fail writes that take longer than `timeout`.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&mut self) -> Result<Option<Vec<u8>>, ConnectionError> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(ConnectionError::Closed);
        };
        let n = reader.read(&mut self.buf).await.map_err(|e| ConnectionError::Read(e.to_string()))?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[..n].to_vec()))
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        let limit = self.write_timeout;
        let Some(writer) = self.writer.as_mut() else {
            return Err(ConnectionError::Closed);
        };

        let written = async {
            writer.write_all(bytes).await?;
            writer.flush().await
        };
        match tokio::time::timeout(limit, written).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ConnectionError::Write(e.to_string())),
            Err(_) => Err(ConnectionError::Write(format!("timed out after {limit:?}"))),
        }
    }

    async fn close(&mut self) {
        self.reader = None;
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.shutdown().await
        {
            tracing::warn!("Failed to shut down link to {}: {e}", self.name);
        }
    }
}

/// Opens links to a serial-over-TCP bridge.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
    read_buffer: usize,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl TcpConnector {
    /// Connect to `addr` (`host:port`) with default settings.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            read_buffer: DEFAULT_READ_BUFFER,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Connect to `addr` using the buffer size and timeouts from `config`.
    pub fn from_config(addr: impl Into<String>, config: &SerialConfig) -> Self {
        Self {
            addr: addr.into(),
            read_buffer: config.read_buffer,
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
        }
    }
}

impl Connector for TcpConnector {
    type Transport = StreamTransport<TcpStream>;

    fn check_support(&self) -> Result<(), SelectionError> {
        Ok(())
    }

    fn open(&self) -> impl Future<Output = Result<StreamTransport<TcpStream>, OpenError>> + Send + 'static {
        let Self { addr, read_buffer, connect_timeout, write_timeout } = self.clone();
        async move {
            let stream = match tokio::time::timeout(connect_timeout, TcpStream::connect(&addr)).await {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) if e.kind() == io::ErrorKind::PermissionDenied => {
                    return Err(SelectionError::PermissionDenied(addr).into());
                },
                Ok(Err(e)) => return Err(ConnectionError::Open(format!("{addr}: {e}")).into()),
                Err(_) => {
                    return Err(ConnectionError::Open(format!("{addr}: timed out after {connect_timeout:?}")).into());
                },
            };
            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!("Failed to disable Nagle on {addr}: {e}");
            }
            Ok(StreamTransport::new(addr.clone(), stream, read_buffer).with_write_timeout(write_timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn chunks_and_end_of_stream() {
        let (ours, mut theirs) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new("duplex", ours, 16);

        theirs.write_all(b"REMAINING:3\n").await.unwrap();
        assert_eq!(transport.read().await, Ok(Some(b"REMAINING:3\n".to_vec())));

        drop(theirs);
        assert_eq!(transport.read().await, Ok(None));
    }

    #[tokio::test]
    async fn writes_reach_the_peer() {
        let (ours, mut theirs) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new("duplex", ours, 16);

        transport.write(b"LIMIT 7\n").await.unwrap();

        let mut buf = [0u8; 8];
        theirs.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"LIMIT 7\n");
    }

    #[tokio::test]
    async fn close_is_idempotent_and_final() {
        let (ours, mut theirs) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new("duplex", ours, 16);

        transport.close().await;
        transport.close().await;

        assert_eq!(transport.read().await, Err(ConnectionError::Closed));
        assert_eq!(transport.write(b"OPEN\n").await, Err(ConnectionError::Closed));

        let mut rest = Vec::new();
        theirs.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn read_is_cancel_safe() {
        let (ours, mut theirs) = tokio::io::duplex(64);
        let mut transport = StreamTransport::new("duplex", ours, 16);

        tokio::select! {
            biased;
            () = std::future::ready(()) => {},
            _ = transport.read() => panic!("nothing was sent"),
        }

        theirs.write_all(b"LOCKED\n").await.unwrap();
        assert_eq!(transport.read().await, Ok(Some(b"LOCKED\n".to_vec())));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_peer_times_out_the_write() {
        let (ours, _theirs) = tokio::io::duplex(8);
        let mut transport = StreamTransport::new("duplex", ours, 16).with_write_timeout(Duration::from_secs(1));

        let result = transport.write(&[b'x'; 64]).await;
        assert!(matches!(result, Err(ConnectionError::Write(reason)) if reason.contains("timed out")));
    }

    #[test]
    fn bridge_settings_come_from_config() {
        let config = SerialConfig {
            read_buffer: 32,
            connect_timeout: Duration::from_millis(250),
            write_timeout: Duration::from_millis(500),
            ..SerialConfig::default()
        };
        let connector = TcpConnector::from_config("gate.local:4001", &config);

        assert_eq!(connector.read_buffer, 32);
        assert_eq!(connector.connect_timeout, Duration::from_millis(250));
        assert_eq!(connector.write_timeout, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn tcp_bridge_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let connector = TcpConnector::new(addr.clone());
        let (opened, accepted) = tokio::join!(connector.open(), listener.accept());
        let mut transport = opened.unwrap();
        let (mut device, _) = accepted.unwrap();

        assert_eq!(transport.name(), addr);
        device.write_all(b"UNLOCKED\n").await.unwrap();
        assert_eq!(transport.read().await, Ok(Some(b"UNLOCKED\n".to_vec())));

        transport.write(b"UNLOCK\n").await.unwrap();
        let mut buf = [0u8; 7];
        device.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"UNLOCK\n");
    }

    #[tokio::test]
    async fn refused_bridge_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = TcpConnector::new(addr).open().await;
        assert!(matches!(result, Err(OpenError::Connection(ConnectionError::Open(_)))));
    }
}
