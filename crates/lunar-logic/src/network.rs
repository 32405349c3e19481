//! Communication network between outposts.
//!
//! Links are derived, never stored: every pair of outposts within range
//! gets an edge, and connectivity is a BFS over those edges rooted at the
//! command outpost.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constants::comm;
use crate::map::distance;
use crate::outpost::{Outpost, OutpostId, OutpostKind};

/// An edge between two outposts within comm range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommLink {
    pub from: OutpostId,
    pub to: OutpostId,
    pub distance: f64,
    /// `1 - distance / range`, in `[0, 1]`.
    pub quality: f64,
    pub is_unstable: bool,
}

impl CommLink {
    pub fn touches(&self, id: OutpostId) -> bool {
        self.from == id || self.to == id
    }
}

/// Result of a connectivity pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkAnalysis {
    pub is_connected: bool,
    pub links: Vec<CommLink>,
    /// Outposts reached from the command outpost, in BFS order.
    pub reachable: Vec<OutpostId>,
}

impl NetworkAnalysis {
    pub fn unstable_links(&self) -> impl Iterator<Item = &CommLink> {
        self.links.iter().filter(|l| l.is_unstable)
    }
}

/// Range of a link between two outpost kinds.
pub fn link_range(a: OutpostKind, b: OutpostKind) -> f64 {
    if a.is_relay() || b.is_relay() {
        comm::MAX_DISTANCE * comm::RELAY_MULTIPLIER
    } else {
        comm::MAX_DISTANCE
    }
}

/// Every in-range pair, in outpost order (`i < j`).
pub fn derive_links(outposts: &[Outpost]) -> Vec<CommLink> {
    let mut links = Vec::new();
    for (i, a) in outposts.iter().enumerate() {
        for b in &outposts[i + 1..] {
            let dist = distance(a.position, b.position);
            let range = link_range(a.kind, b.kind);
            if dist <= range {
                let quality = 1.0 - dist / range;
                links.push(CommLink {
                    from: a.id,
                    to: b.id,
                    distance: dist,
                    quality,
                    is_unstable: quality < comm::STABLE_QUALITY,
                });
            }
        }
    }
    links
}

/// Check whether every outpost can reach the command outpost.
///
/// With no outposts the network is trivially connected. Without a
/// command outpost it is disconnected and no links are reported.
pub fn check_connectivity(outposts: &[Outpost]) -> NetworkAnalysis {
    if outposts.is_empty() {
        return NetworkAnalysis {
            is_connected: true,
            links: Vec::new(),
            reachable: Vec::new(),
        };
    }

    let Some(command) = outposts.iter().find(|o| o.kind == OutpostKind::Command) else {
        return NetworkAnalysis {
            is_connected: false,
            links: Vec::new(),
            reachable: Vec::new(),
        };
    };

    let links = derive_links(outposts);

    let mut adj: HashMap<OutpostId, Vec<OutpostId>> = HashMap::new();
    for link in &links {
        adj.entry(link.from).or_default().push(link.to);
        adj.entry(link.to).or_default().push(link.from);
    }

    let mut visited = HashSet::new();
    let mut reachable = Vec::new();
    let mut queue = VecDeque::new();
    visited.insert(command.id);
    queue.push_back(command.id);

    while let Some(current) = queue.pop_front() {
        reachable.push(current);
        if let Some(neighbors) = adj.get(&current) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    NetworkAnalysis {
        is_connected: reachable.len() == outposts.len(),
        links,
        reachable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Position;
    use crate::outpost::OutpostStatus;

    fn outpost(id: u32, kind: OutpostKind, x: i32, y: i32) -> Outpost {
        Outpost {
            id: OutpostId(id),
            kind,
            position: Position::new(x, y),
            status: OutpostStatus::Provisional,
        }
    }

    #[test]
    fn test_empty_is_connected() {
        let net = check_connectivity(&[]);
        assert!(net.is_connected);
        assert!(net.links.is_empty());
    }

    #[test]
    fn test_lone_command_is_connected() {
        let net = check_connectivity(&[outpost(1, OutpostKind::Command, 5, 5)]);
        assert!(net.is_connected);
        assert_eq!(net.reachable, vec![OutpostId(1)]);
    }

    #[test]
    fn test_no_command_is_disconnected() {
        let net = check_connectivity(&[
            outpost(1, OutpostKind::Power, 0, 0),
            outpost(2, OutpostKind::Mining, 1, 0),
        ]);
        assert!(!net.is_connected);
        assert!(net.links.is_empty());
    }

    #[test]
    fn test_link_quality() {
        let links = derive_links(&[
            outpost(1, OutpostKind::Command, 0, 0),
            outpost(2, OutpostKind::Power, 30, 40),
        ]);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].distance, 50.0);
        assert!((links[0].quality - (1.0 - 50.0 / 150.0)).abs() < 1e-12);
        assert!(!links[0].is_unstable);
    }

    #[test]
    fn test_long_link_is_unstable() {
        let links = derive_links(&[
            outpost(1, OutpostKind::Command, 0, 0),
            outpost(2, OutpostKind::Mining, 100, 0),
        ]);
        assert_eq!(links.len(), 1);
        assert!(links[0].is_unstable);
    }

    #[test]
    fn test_out_of_range_has_no_link() {
        let net = check_connectivity(&[
            outpost(1, OutpostKind::Command, 0, 0),
            outpost(2, OutpostKind::Research, 200, 0),
        ]);
        assert!(net.links.is_empty());
        assert!(!net.is_connected);
    }

    #[test]
    fn test_relay_extends_range() {
        // 200 units: beyond 150 but within 225
        let net = check_connectivity(&[
            outpost(1, OutpostKind::Command, 0, 0),
            outpost(2, OutpostKind::Comm, 200, 0),
        ]);
        assert!(net.is_connected);
        assert!((net.links[0].quality - (1.0 - 200.0 / 225.0)).abs() < 1e-12);
        assert!(net.links[0].is_unstable);
    }

    #[test]
    fn test_multi_hop_through_relay() {
        // Command → relay → research; command and research are 300 apart.
        let net = check_connectivity(&[
            outpost(1, OutpostKind::Command, 0, 0),
            outpost(2, OutpostKind::Comm, 150, 0),
            outpost(3, OutpostKind::Research, 300, 0),
        ]);
        assert!(net.is_connected);
        assert_eq!(net.links.len(), 2);
        assert_eq!(net.reachable, vec![OutpostId(1), OutpostId(2), OutpostId(3)]);
    }

    #[test]
    fn test_island_is_reported_unreachable() {
        let net = check_connectivity(&[
            outpost(1, OutpostKind::Command, 0, 0),
            outpost(2, OutpostKind::Power, 10, 0),
            outpost(3, OutpostKind::Mining, 400, 0),
            outpost(4, OutpostKind::Mining, 410, 0),
        ]);
        assert!(!net.is_connected);
        assert_eq!(net.links.len(), 2);
        assert!(!net.reachable.contains(&OutpostId(3)));
    }

    #[test]
    fn test_link_touches() {
        let link = derive_links(&[
            outpost(7, OutpostKind::Command, 0, 0),
            outpost(9, OutpostKind::Power, 1, 0),
        ])[0];
        assert!(link.touches(OutpostId(7)));
        assert!(link.touches(OutpostId(9)));
        assert!(!link.touches(OutpostId(8)));
    }
}
