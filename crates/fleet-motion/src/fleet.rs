//! The `Fleet` — every boat, indexed by `AgentId`.

use fleet_core::AgentId;

use crate::{Boat, MotionError, MotionResult, MotionState};

/// Dense boat storage.
///
/// `boats[i].id == AgentId(i)` always holds, so lookups are a bounds check
/// and iteration order is ascending `AgentId`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fleet {
    boats: Vec<Boat>,
}

impl Fleet {
    /// Wrap `boats`, which must be numbered densely from 0 in order.
    pub fn new(boats: Vec<Boat>) -> MotionResult<Self> {
        for (i, boat) in boats.iter().enumerate() {
            let expected = AgentId::try_from(i).unwrap_or(AgentId::INVALID);
            if boat.id != expected {
                return Err(MotionError::NonDenseIds { expected, found: boat.id });
            }
        }
        Ok(Self { boats })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boats.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boats.is_empty()
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> MotionResult<&Boat> {
        self.boats.get(id.index()).ok_or(MotionError::UnknownAgent(id))
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> MotionResult<&mut Boat> {
        self.boats.get_mut(id.index()).ok_or(MotionError::UnknownAgent(id))
    }

    #[inline]
    pub fn as_slice(&self) -> &[Boat] {
        &self.boats
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Boat> {
        self.boats.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Boat> {
        self.boats.iter_mut()
    }

    /// Number of boats currently in `state`.
    pub fn count_in(&self, state: MotionState) -> usize {
        self.boats.iter().filter(|b| b.state == state).count()
    }

    /// `true` if any boat is in `state`.
    pub fn any_in(&self, state: MotionState) -> bool {
        self.boats.iter().any(|b| b.state == state)
    }
}

impl<'a> IntoIterator for &'a Fleet {
    type Item = &'a Boat;
    type IntoIter = std::slice::Iter<'a, Boat>;

    fn into_iter(self) -> Self::IntoIter {
        self.boats.iter()
    }
}
