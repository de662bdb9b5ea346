use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use crate::hand::HandFrame;
use crate::{Message, ProtocolError};

pub const MAX_FRAME: usize = 10_000_000;

/// Write one length-prefixed message (u32 little endian + bincode payload).
pub fn write_framed<W: Write>(
	w: &mut W,
	msg: &Message,
) -> Result<(), ProtocolError> {
	let bytes = msg.to_bytes()?;
	if bytes.len() > MAX_FRAME {
		return Err(ProtocolError::Oversize(bytes.len()));
	}
	w.write_all(&(bytes.len() as u32).to_le_bytes())?;
	w.write_all(&bytes)?;
	Ok(())
}

/// Incremental decoder over a byte stream that may be non-blocking.
pub struct FrameReader<R> {
	inner: R,
	buf: Vec<u8>,
	closed: bool,
}

impl<R: Read> FrameReader<R> {
	pub fn new(inner: R) -> Self {
		Self {
			inner,
			buf: Vec::new(),
			closed: false,
		}
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	// pull whatever is available without blocking past WouldBlock
	fn fill(&mut self) -> Result<(), ProtocolError> {
		let mut chunk = [0u8; 4096];
		loop {
			match self.inner.read(&mut chunk) {
				Ok(0) => {
					self.closed = true;
					return Ok(());
				}
				Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
				Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
				Err(e) if e.kind() == ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			}
		}
	}

	fn next_buffered(&mut self) -> Result<Option<Message>, ProtocolError> {
		if self.buf.len() < 4 {
			return Ok(None);
		}
		let len = u32::from_le_bytes([
			self.buf[0],
			self.buf[1],
			self.buf[2],
			self.buf[3],
		]) as usize;
		if len > MAX_FRAME {
			self.buf.clear();
			return Err(ProtocolError::Oversize(len));
		}
		if self.buf.len() < 4 + len {
			return Ok(None);
		}
		let msg = Message::from_bytes(&self.buf[4..4 + len]);
		self.buf.drain(..4 + len);
		msg.map(Some)
	}

	/// Drain everything readable and return the newest hand frame.
	/// Older frames in the backlog are dropped, never queued.
	pub fn read_latest_frame(
		&mut self,
	) -> Result<Option<HandFrame>, ProtocolError> {
		self.fill()?;
		let mut latest = None;
		while let Some(msg) = self.next_buffered()? {
			if let Message::Frame(frame) = msg {
				latest = Some(frame);
			}
		}
		Ok(latest)
	}

	pub fn read_all(&mut self) -> Result<Vec<Message>, ProtocolError> {
		self.fill()?;
		let mut result = Vec::new();
		while let Some(msg) = self.next_buffered()? {
			result.push(msg);
		}
		Ok(result)
	}
}

/// Accepts a single landmark producer and polls it without blocking.
pub struct SockServer {
	path: PathBuf,
	listener: UnixListener,
	reader: Option<FrameReader<UnixStream>>,
}

impl SockServer {
	pub fn bind<P: AsRef<Path>>(path: P) -> Result<Self, ProtocolError> {
		let path = path.as_ref().to_path_buf();
		let _ = std::fs::remove_file(&path);
		let listener = UnixListener::bind(&path)?;
		listener.set_nonblocking(true)?;
		Ok(Self {
			path,
			listener,
			reader: None,
		})
	}

	fn try_accept(&mut self) -> Result<(), ProtocolError> {
		match self.listener.accept() {
			Ok((stream, _)) => {
				stream.set_nonblocking(true)?;
				log::info!("producer connected on {}", self.path.display());
				self.reader = Some(FrameReader::new(stream));
				Ok(())
			}
			Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(()),
			Err(e) => Err(e.into()),
		}
	}

	pub fn poll_latest(&mut self) -> Result<Option<HandFrame>, ProtocolError> {
		if self.reader.is_none() {
			self.try_accept()?;
		}
		let reader = match self.reader.as_mut() {
			None => return Ok(None),
			Some(r) => r,
		};
		let result = reader.read_latest_frame();
		if reader.is_closed() || result.is_err() {
			log::info!("producer disconnected");
			self.reader = None;
		}
		result
	}
}

impl Drop for SockServer {
	fn drop(&mut self) {
		let _ = std::fs::remove_file(&self.path);
	}
}

pub struct SockClient {
	stream: UnixStream,
}

impl SockClient {
	pub fn connect<P: AsRef<Path>>(path: P) -> Result<Self, ProtocolError> {
		let stream = UnixStream::connect(path)?;
		Ok(Self { stream })
	}

	pub fn send_msg(&mut self, msg: &Message) -> Result<(), ProtocolError> {
		write_framed(&mut self.stream, msg)
	}
}
