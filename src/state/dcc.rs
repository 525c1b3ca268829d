//! DCC transfer bookkeeping.
//!
//! Only the entities and their lifecycle live here. Moving bytes belongs to
//! a transport outside the core; it reports progress through
//! [`DccList::set_status`] and [`DccList::finish`].

use std::net::Ipv4Addr;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::HandlerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DccKind {
    ChatRecv,
    ChatSend,
    FileRecv,
    FileSend,
}

impl DccKind {
    pub fn is_chat(self) -> bool {
        matches!(self, Self::ChatRecv | Self::ChatSend)
    }

    pub fn is_send(self) -> bool {
        matches!(self, Self::ChatSend | Self::FileSend)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatRecv => "chat_recv",
            Self::ChatSend => "chat_send",
            Self::FileRecv => "file_recv",
            Self::FileSend => "file_send",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DccStatus {
    Waiting,
    Connecting,
    Active,
    Done,
    Failed,
    Aborted,
}

impl DccStatus {
    /// Done, failed and aborted transfers are finished for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Aborted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

/// One file transfer or chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct DccTransfer {
    pub id: u32,
    pub server: Option<String>,
    pub channel: Option<String>,
    pub kind: DccKind,
    pub status: DccStatus,
    pub start_time: DateTime<Local>,
    pub start_transfer: Option<DateTime<Local>>,
    pub addr: Option<Ipv4Addr>,
    pub port: u16,
    /// Remote peer.
    pub nick: Option<String>,
    /// Name announced on the wire.
    pub filename: Option<String>,
    pub local_filename: Option<PathBuf>,
    /// Suffix appended to `local_filename` when renaming on collision.
    pub filename_suffix: u32,
    pub size: u64,
    pub pos: u64,
    pub start_resume: u64,
    pub bytes_per_sec: u64,
}

/// A parsed `DCC SEND` or `DCC CHAT` offer from a CTCP payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DccOffer {
    pub kind: DccKind,
    pub filename: String,
    pub addr: Ipv4Addr,
    pub port: u16,
    pub size: u64,
}

impl DccOffer {
    /// Parse the parameters after `DCC`: `SEND <file> <addr> <port> <size>`
    /// or `CHAT chat <addr> <port>`. Filenames may be double-quoted.
    pub fn parse(params: &str) -> Option<Self> {
        let (verb, rest) = params.trim_start().split_once(' ')?;
        let rest = rest.trim_start();
        let (filename, rest) = match rest.strip_prefix('"') {
            Some(quoted) => {
                let (name, tail) = quoted.split_once('"')?;
                (name, tail)
            }
            None => rest.split_once(' ')?,
        };

        let mut fields = rest.split_whitespace();
        let addr = Ipv4Addr::from(fields.next()?.parse::<u32>().ok()?);
        let port = fields.next()?.parse().ok()?;

        let (kind, size) = if verb.eq_ignore_ascii_case("SEND") {
            (DccKind::FileRecv, fields.next().and_then(|s| s.parse().ok()).unwrap_or(0))
        } else if verb.eq_ignore_ascii_case("CHAT") {
            (DccKind::ChatRecv, 0)
        } else {
            return None;
        };

        Some(Self {
            kind,
            filename: filename.to_owned(),
            addr,
            port,
            size,
        })
    }
}

/// Every live transfer, in creation order.
#[derive(Debug, Default)]
pub struct DccList {
    transfers: Vec<DccTransfer>,
    next_id: u32,
}

impl DccList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transfer in `Waiting` status.
    pub fn create(
        &mut self,
        kind: DccKind,
        server: Option<&str>,
        nick: Option<&str>,
    ) -> &mut DccTransfer {
        self.next_id += 1;
        let id = self.next_id;
        debug!(id, kind = kind.as_str(), "dcc created");
        self.transfers.push(DccTransfer {
            id,
            server: server.map(str::to_owned),
            channel: None,
            kind,
            status: DccStatus::Waiting,
            start_time: Local::now(),
            start_transfer: None,
            addr: None,
            port: 0,
            nick: nick.map(str::to_owned),
            filename: None,
            local_filename: None,
            filename_suffix: 0,
            size: 0,
            pos: 0,
            start_resume: 0,
            bytes_per_sec: 0,
        });
        let last = self.transfers.len() - 1;
        &mut self.transfers[last]
    }

    /// Create a receiving transfer from a peer's offer.
    pub fn accept_offer(&mut self, offer: &DccOffer, server: &str, nick: &str) -> &mut DccTransfer {
        let transfer = self.create(offer.kind, Some(server), Some(nick));
        transfer.addr = Some(offer.addr);
        transfer.port = offer.port;
        transfer.size = offer.size;
        if !offer.kind.is_chat() {
            transfer.filename = Some(offer.filename.clone());
        }
        transfer
    }

    /// Inbound offers still waiting for the user.
    pub fn pending_offers(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| t.status == DccStatus::Waiting && !t.kind.is_send())
            .count()
    }

    pub fn get(&self, id: u32) -> Option<&DccTransfer> {
        self.transfers.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DccTransfer> {
        self.transfers.iter()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Move a live transfer to a non-terminal status.
    pub fn set_status(&mut self, id: u32, status: DccStatus) -> Result<(), HandlerError> {
        if status.is_terminal() {
            return Err(HandlerError::InvalidArgument(format!(
                "use finish to end DCC #{id} as {}",
                status.as_str()
            )));
        }
        let transfer = self
            .transfers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(HandlerError::NoSuchTransfer(id))?;
        if status == DccStatus::Active && transfer.start_transfer.is_none() {
            transfer.start_transfer = Some(Local::now());
        }
        transfer.status = status;
        Ok(())
    }

    /// End a transfer with a terminal status and release it.
    pub fn finish(&mut self, id: u32, status: DccStatus) -> Result<DccTransfer, HandlerError> {
        if !status.is_terminal() {
            return Err(HandlerError::InvalidArgument(format!(
                "{} is not a final DCC status",
                status.as_str()
            )));
        }
        let index = self
            .transfers
            .iter()
            .position(|t| t.id == id)
            .ok_or(HandlerError::NoSuchTransfer(id))?;
        let mut transfer = self.transfers.remove(index);
        transfer.status = status;
        debug!(id, status = status.as_str(), "dcc finished");
        Ok(transfer)
    }

    /// Abort a transfer on user or plugin request.
    pub fn cancel(&mut self, id: u32) -> Result<DccTransfer, HandlerError> {
        self.finish(id, DccStatus::Aborted)
    }
}
