pub use atsam4e::Atsam4eHomeGateway;
pub use frdm_k64f::FrdmK64f;

use crate::{
    memory_map::MemoryMap,
    target_config::{TargetConfig, BOARD_ID_LEN},
};

pub mod atsam4e;
pub mod frdm_k64f;

/// This is a helper struct, which allows you to iterate over every target defined
pub struct TargetIter {
    inner: std::vec::IntoIter<Box<dyn TargetInfo>>,
}

impl TargetIter {
    /// Creates a new TargetIter
    pub fn new() -> Self {
        Self {
            inner: vec![
                Box::new(Atsam4eHomeGateway) as Box<dyn TargetInfo>,
                Box::new(FrdmK64f),
            ]
            .into_iter(),
        }
    }

    pub fn find_by_name(name: &str) -> Option<Box<dyn TargetInfo>> {
        Self::new().find(|target| target.board_name().eq_ignore_ascii_case(name))
    }

    /// Looks a target up by board id.
    ///
    /// A full DAPLink unique id is accepted too, since its first four characters
    /// are the board id.
    pub fn find_by_board_id(id: &str) -> Option<Box<dyn TargetInfo>> {
        let id = id.trim();
        let board_id = id.get(..BOARD_ID_LEN)?;
        Self::new().find(|target| target.target_config().board_id.eq_ignore_ascii_case(board_id))
    }

    /// Looks a target up by name first, then by board id
    pub fn lookup(key: &str) -> Option<Box<dyn TargetInfo>> {
        Self::find_by_name(key).or_else(|| Self::find_by_board_id(key))
    }
}

impl Default for TargetIter {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for TargetIter {
    type Item = Box<dyn TargetInfo>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// This trait helps by allowing for definitions of multiple different targets.
pub trait TargetInfo {
    /// Get the target's name
    fn board_name(&self) -> &'static str;

    /// Optional, a one line description of the board, defaults to the name
    fn description(&self) -> &'static str {
        self.board_name()
    }

    /// The record handed to the interface firmware
    fn target_config(&self) -> &'static TargetConfig;

    /// Optional, targets with split RAM banks can describe them here
    fn memory_map(&self) -> MemoryMap {
        MemoryMap::from_config(self.target_config())
    }
}
