//! Channels, private conversations and their nick lists.

use std::fmt;

use slirc_proto::irc_eq;

/// Per-channel role and status bits of a nick.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NickFlags(u8);

impl NickFlags {
    pub const CHANOWNER: Self = Self(0x01);
    pub const CHANADMIN: Self = Self(0x02);
    pub const OP: Self = Self(0x04);
    pub const HALFOP: Self = Self(0x08);
    pub const VOICE: Self = Self(0x10);
    pub const AWAY: Self = Self(0x20);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Self, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    /// Flag for a NAMES prefix character (`~&@%+`).
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '~' => Some(Self::CHANOWNER),
            '&' => Some(Self::CHANADMIN),
            '@' => Some(Self::OP),
            '%' => Some(Self::HALFOP),
            '+' => Some(Self::VOICE),
            _ => None,
        }
    }

    /// The strongest role as a display prefix.
    pub fn prefix(self) -> &'static str {
        if self.contains(Self::CHANOWNER) {
            "~"
        } else if self.contains(Self::CHANADMIN) {
            "&"
        } else if self.contains(Self::OP) {
            "@"
        } else if self.contains(Self::HALFOP) {
            "%"
        } else if self.contains(Self::VOICE) {
            "+"
        } else {
            ""
        }
    }

    /// Operator-level role (owner, admin or op).
    pub fn is_op(self) -> bool {
        self.0 & (Self::CHANOWNER.0 | Self::CHANADMIN.0 | Self::OP.0) != 0
    }
}

impl fmt::Debug for NickFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NickFlags({:#04x})", self.0)
    }
}

/// A nick present in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nick {
    pub name: String,
    pub flags: NickFlags,
}

impl Nick {
    /// Split a NAMES token such as `@+alice` into name and flags.
    pub fn from_names_token(token: &str) -> Self {
        let mut flags = NickFlags::empty();
        let name = token.trim_start_matches(|c: char| match NickFlags::from_prefix(c) {
            Some(flag) => {
                flags.insert(flag);
                true
            }
            None => false,
        });
        Self {
            name: name.to_owned(),
            flags,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Channel,
    /// One-to-one conversation with a nick.
    Private,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Private => "private",
        }
    }
}

/// Counts shown after a NAMES burst.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NickCounts {
    pub total: usize,
    pub ops: usize,
    pub halfops: usize,
    pub voices: usize,
    pub normal: usize,
}

/// A channel or private conversation.
#[derive(Debug, Clone)]
pub struct Channel {
    pub kind: ChannelKind,
    pub name: String,
    pub topic: Option<String>,
    /// Flag letters without the leading `+`.
    pub modes: String,
    pub limit: Option<u32>,
    pub key: Option<String>,
    nicks: Vec<Nick>,
}

impl Channel {
    pub fn new(kind: ChannelKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            topic: None,
            modes: String::new(),
            limit: None,
            key: None,
            nicks: Vec::new(),
        }
    }

    pub fn is_private(&self) -> bool {
        self.kind == ChannelKind::Private
    }

    pub fn nicks(&self) -> &[Nick] {
        &self.nicks
    }

    pub fn nick_count(&self) -> usize {
        self.nicks.len()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.nicks.iter().position(|n| irc_eq(&n.name, name))
    }

    pub fn nick(&self, name: &str) -> Option<&Nick> {
        self.position(name).map(|i| &self.nicks[i])
    }

    pub fn nick_mut(&mut self, name: &str) -> Option<&mut Nick> {
        self.position(name).map(|i| &mut self.nicks[i])
    }

    /// Add a nick, or merge the flags into an existing entry with the same
    /// name so names stay unique.
    pub fn add_nick(&mut self, name: &str, flags: NickFlags) -> &mut Nick {
        let index = match self.position(name) {
            Some(i) => {
                self.nicks[i].flags.insert(flags);
                i
            }
            None => {
                self.nicks.push(Nick {
                    name: name.to_owned(),
                    flags,
                });
                self.nicks.len() - 1
            }
        };
        &mut self.nicks[index]
    }

    pub fn remove_nick(&mut self, name: &str) -> Option<Nick> {
        self.position(name).map(|i| self.nicks.remove(i))
    }

    /// Rename a nick in place, keeping its flags. A stale entry already
    /// holding `new` is dropped. Returns false if `old` is absent.
    pub fn rename_nick(&mut self, old: &str, new: &str) -> bool {
        let Some(index) = self.position(old) else {
            return false;
        };
        let stale = self
            .nicks
            .iter()
            .enumerate()
            .position(|(i, n)| i != index && irc_eq(&n.name, new));
        let index = match stale {
            Some(s) => {
                self.nicks.remove(s);
                if s < index { index - 1 } else { index }
            }
            None => index,
        };
        self.nicks[index].name = new.to_owned();
        true
    }

    pub fn clear_nicks(&mut self) {
        self.nicks.clear();
    }

    pub fn counts(&self) -> NickCounts {
        let mut counts = NickCounts {
            total: self.nicks.len(),
            ..NickCounts::default()
        };
        for nick in &self.nicks {
            if nick.flags.is_op() {
                counts.ops += 1;
            } else if nick.flags.contains(NickFlags::HALFOP) {
                counts.halfops += 1;
            } else if nick.flags.contains(NickFlags::VOICE) {
                counts.voices += 1;
            } else {
                counts.normal += 1;
            }
        }
        counts
    }

    /// Set or clear a flag letter in the mode string.
    pub fn set_mode_flag(&mut self, letter: char, on: bool) {
        let present = self.modes.contains(letter);
        if on && !present {
            self.modes.push(letter);
        } else if !on && present {
            self.modes.retain(|c| c != letter);
        }
    }

    /// Apply a channel MODE change: `+ov-l bob carol`.
    ///
    /// Prefix modes update nick flags, `k` and `l` update key and limit,
    /// list modes (`b`, `e`, `I`) consume their mask, every other letter is
    /// a plain flag.
    pub fn apply_modes(&mut self, modes: &str, args: &[&str]) {
        let mut args = args.iter().copied();
        let mut adding = true;

        for letter in modes.chars() {
            match letter {
                '+' => adding = true,
                '-' => adding = false,
                'q' | 'a' | 'o' | 'h' | 'v' => {
                    let Some(target) = args.next() else { continue };
                    let flag = match letter {
                        'q' => NickFlags::CHANOWNER,
                        'a' => NickFlags::CHANADMIN,
                        'o' => NickFlags::OP,
                        'h' => NickFlags::HALFOP,
                        _ => NickFlags::VOICE,
                    };
                    if let Some(nick) = self.nick_mut(target) {
                        nick.flags.set(flag, adding);
                    }
                }
                'k' => {
                    // Servers usually echo the key on removal too.
                    let key = args.next();
                    self.key = if adding { key.map(str::to_owned) } else { None };
                    self.set_mode_flag('k', adding);
                }
                'l' => {
                    self.limit = if adding {
                        args.next().and_then(|l| l.parse().ok())
                    } else {
                        None
                    };
                    self.set_mode_flag('l', adding);
                }
                'b' | 'e' | 'I' => {
                    args.next();
                }
                other => self.set_mode_flag(other, adding),
            }
        }
    }
}
