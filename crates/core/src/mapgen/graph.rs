//! Room-graph queries over recorded connections.

use std::collections::{BTreeSet, VecDeque};

use crate::types::RoomId;

use super::model::{Level, Room};

pub fn neighbours(rooms: &[Room], id: RoomId) -> Vec<RoomId> {
    let Some(room) = rooms.get(id.index()) else {
        return Vec::new();
    };
    let mut partners: Vec<RoomId> =
        room.connections.iter().map(|connection| connection.partner).collect();
    partners.sort_unstable();
    partners.dedup();
    partners
}

/// Rooms reachable from `start` by following connections, `start` included.
pub fn component(rooms: &[Room], start: RoomId) -> BTreeSet<RoomId> {
    let mut seen = BTreeSet::new();
    if start.index() >= rooms.len() {
        return seen;
    }
    let mut open = VecDeque::from([start]);
    seen.insert(start);
    while let Some(id) = open.pop_front() {
        for next in neighbours(rooms, id) {
            if seen.insert(next) {
                open.push_back(next);
            }
        }
    }
    seen
}

pub fn rooms_connected(rooms: &[Room], from: RoomId, to: RoomId) -> bool {
    component(rooms, from).contains(&to)
}

/// Rooms with exactly one distinct neighbour.
pub fn dead_end_rooms(rooms: &[Room]) -> Vec<RoomId> {
    rooms.iter().map(|room| room.id).filter(|&id| neighbours(rooms, id).len() == 1).collect()
}

impl Level {
    pub fn neighbours(&self, id: RoomId) -> Vec<RoomId> {
        neighbours(&self.rooms, id)
    }

    pub fn rooms_connected(&self, from: RoomId, to: RoomId) -> bool {
        rooms_connected(&self.rooms, from, to)
    }

    pub fn dead_end_rooms(&self) -> Vec<RoomId> {
        dead_end_rooms(&self.rooms)
    }
}
