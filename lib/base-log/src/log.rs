use std::{cell::RefCell, collections::VecDeque, fmt::Debug};

use arrayvec::ArrayString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for ::log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Verbose => ::log::Level::Trace,
            LogLevel::Debug => ::log::Level::Debug,
            LogLevel::Info => ::log::Level::Info,
            LogLevel::Warning => ::log::Level::Warn,
            LogLevel::Error => ::log::Level::Error,
        }
    }
}

pub trait SystemLogInterface {
    /// Logs useful informations grouped by a log level
    fn log(&self, log_level: LogLevel) -> LogItemConcat;
}

/// A single finished log line, truncated to a fixed capacity.
#[derive(Debug, Default, Clone)]
pub struct LogItem {
    pub level: Option<LogLevel>,
    msg: ArrayString<512>,
}

impl LogItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }

    fn push_str(&mut self, s: &str) {
        let remaining = self.msg.remaining_capacity();
        if s.len() <= remaining {
            self.msg.push_str(s);
        } else {
            // cut at a char boundary
            let mut end = remaining;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            self.msg.push_str(&s[..end]);
        }
    }
}

/// Builder for one log item, the item is emitted on drop.
pub struct LogItemConcat<'a> {
    log_item: LogItem,
    log_level: LogLevel,
    group: &'a SystemLogGroup,
}

impl<'a> LogItemConcat<'a> {
    pub fn msg(&mut self, msg_str: &str) -> &mut Self {
        self.log_item.push_str(msg_str);
        self
    }

    pub fn msg_var<T: ToString>(&mut self, val: &T) -> &mut Self {
        self.log_item.push_str(val.to_string().as_str());
        self
    }

    pub fn msg_dbg<T: Debug>(&mut self, val: T) -> &mut Self {
        self.log_item.push_str(&format!("{:?}", val));
        self
    }
}

impl<'a> Drop for LogItemConcat<'a> {
    fn drop(&mut self) {
        let mut tmp = LogItem::new();
        std::mem::swap(&mut self.log_item, &mut tmp);
        tmp.level = Some(self.log_level);
        ::log::log!(
            target: self.group.name.as_str(),
            ::log::Level::from(self.log_level),
            "{}",
            tmp.msg()
        );
        let mut local_logs = self.group.local_logs.borrow_mut();
        if local_logs.len() >= self.group.history_len {
            local_logs.pop_front();
        }
        local_logs.push_back(tmp);
    }
}

/// A named group of log items, e.g. one per simulated world.
#[derive(Debug)]
pub struct SystemLogGroup {
    name: String,
    history_len: usize,
    local_logs: RefCell<VecDeque<LogItem>>,
}

impl SystemLogGroup {
    fn new(name: String, history_len: usize) -> Self {
        Self {
            name,
            history_len,
            local_logs: RefCell::new(VecDeque::with_capacity(history_len.min(512))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The most recent items of this group, oldest first.
    pub fn history(&self) -> Vec<LogItem> {
        self.local_logs.borrow().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.local_logs.borrow_mut().clear();
    }
}

impl Clone for SystemLogGroup {
    /// Clones the group name, not the history.
    fn clone(&self) -> Self {
        Self::new(self.name.clone(), self.history_len)
    }
}

impl SystemLogInterface for SystemLogGroup {
    fn log(&self, log_level: LogLevel) -> LogItemConcat {
        LogItemConcat {
            log_item: LogItem::new(),
            log_level,
            group: self,
        }
    }
}

#[derive(Debug)]
pub struct SystemLog {
    history_len: usize,
}

impl Default for SystemLog {
    fn default() -> Self {
        Self { history_len: 256 }
    }
}

impl SystemLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_len(history_len: usize) -> Self {
        Self { history_len }
    }

    pub fn logger(&self, sys: &str) -> SystemLogGroup {
        SystemLogGroup::new(sys.to_string(), self.history_len)
    }
}
