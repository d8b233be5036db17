//! The mio-driven I/O event loop (`spec.md` §4.2): one `TcpListener` accept
//! path plus per-client framed `TcpStream`s for the reliable channel, and a
//! single `UdpSocket` shared by every client for the datagram channel.
//!
//! Grounded on `neutronium::net::endpoint::Endpoint`'s poll/token/readiness
//! loop, simplified to a single `mio::Poll` (the teacher splits handshake
//! and live traffic across three separate `Poll` instances to firewall
//! unauthenticated peers; this protocol has no handshake encryption stage
//! to isolate, per `spec.md`'s Non-goals, so one poll instance suffices).

use std::collections::{HashMap as StdHashMap, VecDeque};
use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};

use mio::net::{TcpListener, TcpStream, UdpSocket};
use mio::{Events, Poll, PollOpt, Ready, Token};

use rt_common::logging::{self, Logger};

use crate::buffer::{FrameReader, FrameWriter};
use crate::error::ProtoError;
use crate::frame::Header;
use crate::messages::ClientId;

const LISTENER_TOKEN: Token = Token(0);
const UDP_TOKEN: Token = Token(1);
const CLIENT_TOKEN_BASE: usize = 2;

/// A unit of work handed from the I/O thread to the simulation thread.
pub enum InboundEvent {
    Reliable { client: ClientId, header: Header, payload: Vec<u8> },
    Datagram { client: ClientId, header: Header, payload: Vec<u8> },
    ClientConnected { client: ClientId, addr: SocketAddr },
    ClientDisconnected { client: ClientId },
}

/// Shared, mutex-guarded handoff point between the I/O event loop and
/// whatever thread owns the simulation (`spec.md` §5: "the accept/I/O loop
/// and the simulation step never run on the same stack frame, but they may
/// share a thread").
#[derive(Clone)]
pub struct InputQueue {
    inner: Arc<Mutex<Vec<InboundEvent>>>,
}

impl Default for InputQueue {
    fn default() -> Self {
        InputQueue { inner: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl InputQueue {
    pub fn push(&self, event: InboundEvent) {
        self.inner.lock().expect("input queue poisoned").push(event);
    }

    /// Drain everything queued so far. Called once per simulation tick,
    /// before the tick's systems run.
    pub fn drain(&self) -> Vec<InboundEvent> {
        std::mem::take(&mut *self.inner.lock().expect("input queue poisoned"))
    }
}

struct ClientSlot {
    stream: TcpStream,
    addr: SocketAddr,
    reader: FrameReader,
    writer: FrameWriter,
    udp_sequence: u32,
    /// The address this client's datagrams actually arrive from, learned
    /// from its first UDP packet (see `pending_udp`/`register_datagram_
    /// source`) — distinct from `addr`, the TCP peer address, since the
    /// client's UDP socket is a separate ephemeral-port binding.
    udp_addr: Option<SocketAddr>,
}

/// Owns the listener, the UDP socket and every live client's framed TCP
/// stream. `poll_once` drives one iteration of the readiness loop and
/// pushes decoded frames onto the shared [`InputQueue`].
pub struct Transport {
    poll: Poll,
    events: Events,
    listener: TcpListener,
    udp: UdpSocket,
    clients: StdHashMap<ClientId, ClientSlot>,
    addr_to_client: StdHashMap<SocketAddr, ClientId>,
    /// Clients that have been told (over the reliable channel) to start
    /// sending datagrams, queued per source IP, awaiting their first UDP
    /// packet. The datagram channel has no client id of its own (`spec.md`
    /// §4.1's layouts carry none), so a client's UDP source port is
    /// unknown until it actually sends something; FIFO per IP disambiguates
    /// same-host clients (e.g. local integration tests) in send order.
    pending_udp: StdHashMap<IpAddr, VecDeque<ClientId>>,
    next_client_id: u32,
    input_queue: InputQueue,
    log: Logger,
}

impl Transport {
    pub fn bind(tcp_addr: SocketAddr, udp_addr: SocketAddr, log: Logger) -> io::Result<Self> {
        let poll = Poll::new()?;
        let listener = TcpListener::bind(&tcp_addr)?;
        let udp = UdpSocket::bind(&udp_addr)?;

        poll.register(&listener, LISTENER_TOKEN, Ready::readable(), PollOpt::edge())?;
        poll.register(&udp, UDP_TOKEN, Ready::readable(), PollOpt::edge())?;

        Ok(Transport {
            poll,
            events: Events::with_capacity(1024),
            listener,
            udp,
            clients: StdHashMap::new(),
            addr_to_client: StdHashMap::new(),
            pending_udp: StdHashMap::new(),
            next_client_id: 1,
            input_queue: InputQueue::default(),
            log: log.new(logging::o!("subsystem" => "transport")),
        })
    }

    pub fn input_queue(&self) -> InputQueue {
        self.input_queue.clone()
    }

    fn client_token(id: ClientId) -> Token {
        Token(CLIENT_TOKEN_BASE + id as usize)
    }

    fn token_to_client(token: Token) -> ClientId {
        (token.0 - CLIENT_TOKEN_BASE) as ClientId
    }

    /// Block until at least one readiness event arrives (or `timeout`
    /// elapses), then service every ready source exactly once.
    pub fn poll_once(&mut self, timeout: std::time::Duration) -> io::Result<()> {
        self.poll.poll(&mut self.events, Some(timeout))?;

        let tokens: Vec<Token> = self.events.iter().map(|e| e.token()).collect();
        for token in tokens {
            match token {
                LISTENER_TOKEN => self.accept_pending()?,
                UDP_TOKEN => self.read_datagrams(),
                other => self.service_client(Self::token_to_client(other)),
            }
        }
        Ok(())
    }

    fn accept_pending(&mut self) -> io::Result<()> {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    let client_id = self.next_client_id as ClientId;
                    self.next_client_id += 1;

                    self.poll.register(
                        &stream,
                        Self::client_token(client_id),
                        Ready::readable() | Ready::writable(),
                        PollOpt::edge(),
                    )?;

                    logging::info!(self.log, "client connected"; "client" => client_id, "addr" => %addr);

                    self.clients.insert(
                        client_id,
                        ClientSlot {
                            stream,
                            addr,
                            reader: FrameReader::new(),
                            writer: FrameWriter::new(),
                            udp_sequence: 0,
                            udp_addr: None,
                        },
                    );
                    self.input_queue.push(InboundEvent::ClientConnected { client: client_id, addr });
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    fn service_client(&mut self, client_id: ClientId) {
        let disconnect = {
            let Some(slot) = self.clients.get_mut(&client_id) else { return };
            let mut buf = [0u8; 4096];

            loop {
                match slot.stream.read(&mut buf) {
                    Ok(0) => break true,
                    Ok(n) => slot.reader.feed(&buf[..n]),
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break false,
                    Err(_) => break true,
                }
            }
        };

        if disconnect {
            self.drop_client(client_id);
            return;
        }

        loop {
            let frame = {
                let Some(slot) = self.clients.get_mut(&client_id) else { return };
                match slot.reader.try_take_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => return,
                    Err(_) => {
                        self.drop_client(client_id);
                        return;
                    }
                }
            };
            let (header, payload) = frame;
            self.input_queue.push(InboundEvent::Reliable { client: client_id, header, payload });
        }
    }

    /// Called once a client has been sent `GameStart` and is expected to
    /// start sending datagrams shortly after. Queued by the client's known
    /// TCP-connection IP so the next unrecognized packet from that IP gets
    /// paired to it.
    pub fn expect_datagram_from(&mut self, client_id: ClientId) {
        let Some(slot) = self.clients.get(&client_id) else { return };
        self.pending_udp.entry(slot.addr.ip()).or_default().push_back(client_id);
    }

    fn register_datagram_source(&mut self, addr: SocketAddr) {
        if let Some(queue) = self.pending_udp.get_mut(&addr.ip()) {
            if let Some(client_id) = queue.pop_front() {
                if queue.is_empty() {
                    self.pending_udp.remove(&addr.ip());
                }
                logging::info!(self.log, "datagram source registered"; "client" => client_id, "addr" => %addr);
                self.addr_to_client.insert(addr, client_id);
                if let Some(slot) = self.clients.get_mut(&client_id) {
                    slot.udp_addr = Some(addr);
                }
            }
        }
    }

    fn read_datagrams(&mut self) {
        let mut buf = [0u8; 65536];
        loop {
            match self.udp.recv_from(&mut buf) {
                Ok((n, addr)) => {
                    if !self.addr_to_client.contains_key(&addr) {
                        self.register_datagram_source(addr);
                    }
                    let Some(&client_id) = self.addr_to_client.get(&addr) else { continue };
                    if let Ok(header) = Header::decode(&buf[..n]) {
                        let start = crate::frame::HEADER_SIZE;
                        let end = start + header.length as usize;
                        if end <= n {
                            self.input_queue.push(InboundEvent::Datagram {
                                client: client_id,
                                header,
                                payload: buf[start..end].to_vec(),
                            });
                        }
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(_) => return,
            }
        }
    }

    /// Enqueue a reliable-channel frame for `client`; actually flushed on
    /// the next writable readiness event.
    pub fn send_reliable(&mut self, client: ClientId, header: &Header, payload: &[u8]) -> Result<(), ProtoError> {
        let Some(slot) = self.clients.get_mut(&client) else { return Ok(()) };
        slot.writer.push_frame(header, payload)
    }

    /// Send a datagram immediately; there is no retransmission, matching
    /// the unreliable-channel contract in `spec.md` §4. A no-op until the
    /// client's UDP source address has been learned (see `udp_addr`) —
    /// equivalent to a lost packet, which this channel already tolerates.
    pub fn send_datagram(&mut self, client: ClientId, msg_type: u8, payload: &[u8]) -> Result<(), ProtoError> {
        let Some(slot) = self.clients.get_mut(&client) else { return Ok(()) };
        let Some(dest) = slot.udp_addr else { return Ok(()) };
        slot.udp_sequence = slot.udp_sequence.wrapping_add(1);
        let header = Header { msg_type, length: payload.len() as u32, sequence: slot.udp_sequence };
        let mut buf = vec![0u8; crate::frame::HEADER_SIZE];
        header.encode((&mut buf[..]).try_into().expect("header buffer is exactly HEADER_SIZE"))?;
        buf.extend_from_slice(payload);
        let _ = self.udp.send_to(&buf, &dest);
        Ok(())
    }

    /// Flush every client's pending reliable-channel writes that the
    /// socket will currently accept.
    pub fn flush_writes(&mut self) {
        for slot in self.clients.values_mut() {
            if slot.writer.is_empty() {
                continue;
            }
            match slot.stream.write(slot.writer.as_slice()) {
                Ok(n) => slot.writer.consume(n),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(_) => {}
            }
        }
    }

    pub fn drop_client(&mut self, client_id: ClientId) {
        if let Some(slot) = self.clients.remove(&client_id) {
            let _ = self.poll.deregister(&slot.stream);
            self.addr_to_client.retain(|_, &mut id| id != client_id);
            if let Some(queue) = self.pending_udp.get_mut(&slot.addr.ip()) {
                queue.retain(|&id| id != client_id);
                if queue.is_empty() {
                    self.pending_udp.remove(&slot.addr.ip());
                }
            }
            logging::info!(self.log, "client disconnected"; "client" => client_id);
            self.input_queue.push(InboundEvent::ClientDisconnected { client: client_id });
        }
    }
}
