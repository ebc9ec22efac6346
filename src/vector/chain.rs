//! Join line parts that share endpoints into longer chains.

use geo::Coord;
use std::collections::HashMap;

/// Endpoints closer than this (degrees) are treated as the same node
pub const NODE_TOLERANCE: f64 = 1e-7;

type NodeKey = (i64, i64);

fn node_key(c: &Coord<f64>) -> NodeKey {
    (
        (c.x / NODE_TOLERANCE).round() as i64,
        (c.y / NODE_TOLERANCE).round() as i64,
    )
}

pub fn same_node(a: &Coord<f64>, b: &Coord<f64>) -> bool {
    node_key(a) == node_key(b)
}

/// A chain whose last coordinate meets its first
pub fn is_closed_chain(coords: &[Coord<f64>]) -> bool {
    coords.len() >= 4 && same_node(&coords[0], &coords[coords.len() - 1])
}

/// Merge parts end-to-end wherever two parts share an endpoint.
///
/// Parts are reversed as needed. Closed results get their last coordinate
/// set exactly to the first.
pub fn chain_parts(parts: Vec<Vec<Coord<f64>>>) -> Vec<Vec<Coord<f64>>> {
    let mut pool: Vec<Option<Vec<Coord<f64>>>> = parts
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(Some)
        .collect();

    let mut ends: HashMap<NodeKey, Vec<usize>> = HashMap::new();
    for (i, part) in pool.iter().enumerate() {
        if let Some(coords) = part {
            ends.entry(node_key(&coords[0])).or_default().push(i);
            ends.entry(node_key(&coords[coords.len() - 1]))
                .or_default()
                .push(i);
        }
    }

    let mut chains = Vec::new();

    for i in 0..pool.len() {
        let Some(mut chain) = pool[i].take() else {
            continue;
        };

        // Grow forward, flip, grow forward again, flip back
        for _ in 0..2 {
            while !is_closed_chain(&chain) {
                let Some(tail) = chain.last().copied() else {
                    break;
                };
                let key = node_key(&tail);
                let next = ends
                    .get(&key)
                    .and_then(|ids| ids.iter().copied().find(|&j| pool[j].is_some()));
                let Some(mut piece) = next.and_then(|j| pool[j].take()) else {
                    break;
                };
                if node_key(&piece[0]) != key {
                    piece.reverse();
                }
                chain.extend(piece.into_iter().skip(1));
            }
            chain.reverse();
        }

        if is_closed_chain(&chain) {
            let first = chain[0];
            let last = chain.len() - 1;
            chain[last] = first;
        }
        chains.push(chain);
    }

    chains
}
