//! Route Discovery
//!
//! A route is a chain of pairs leading from an input token to an output
//! token. Discovery walks a token -> pair adjacency map with an explicit
//! stack, bounded by a hop count.

use std::collections::{HashMap, HashSet};

use lb_core::{Address, Token};
use serde::Serialize;

use crate::pair::Pair;
use crate::state::LbError;

/// A loop-free path of pairs from `input` to `output`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub pairs: Vec<Pair>,
    /// Tokens visited in order, `pairs.len() + 1` long
    pub path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl Route {
    /// Build a route, checking that consecutive pairs connect.
    ///
    /// When `output` is `None` it is taken to be the last token of the path.
    pub fn new(pairs: Vec<Pair>, input: Token, output: Option<Token>) -> Result<Self, LbError> {
        if pairs.is_empty() {
            return Err(LbError::EmptyRoute);
        }

        let mut path = Vec::with_capacity(pairs.len() + 1);
        path.push(input.clone());
        for pair in &pairs {
            let current = &path[path.len() - 1];
            let next = pair
                .other(current)
                .ok_or_else(|| LbError::DisconnectedRoute {
                    pair: pair.to_string(),
                    token: current.address,
                })?
                .clone();
            path.push(next);
        }

        let last = path[path.len() - 1].clone();
        let output = match output {
            Some(output) if output != last => {
                return Err(LbError::DisconnectedRoute {
                    pair: pairs[pairs.len() - 1].to_string(),
                    token: output.address,
                })
            }
            Some(output) => output,
            None => last,
        };

        Ok(Self {
            pairs,
            path,
            input,
            output,
        })
    }

    pub fn path_to_addresses(&self) -> Vec<Address> {
        self.path.iter().map(|token| token.address).collect()
    }

    pub fn hops(&self) -> usize {
        self.pairs.len()
    }
}

/// One level of the search: the token we are standing on and how far we
/// have got through its adjacency list
struct Frame {
    token: Token,
    next_edge: usize,
}

/// Every route from `input` to `output` using at most `max_hops` pairs.
///
/// A pair is used at most once per route and no token is revisited. Routes
/// come out in depth-first order following the order of `pairs`.
pub fn create_all_routes(
    pairs: &[Pair],
    input: &Token,
    output: &Token,
    max_hops: usize,
) -> Vec<Route> {
    let mut routes = Vec::new();
    if max_hops == 0 || input == output {
        return routes;
    }

    let mut adjacency: HashMap<&Token, Vec<usize>> = HashMap::new();
    for (index, pair) in pairs.iter().enumerate() {
        adjacency.entry(&pair.token0).or_default().push(index);
        adjacency.entry(&pair.token1).or_default().push(index);
    }

    let mut stack = vec![Frame {
        token: input.clone(),
        next_edge: 0,
    }];
    let mut used_pairs: Vec<usize> = Vec::new();
    let mut used_set: HashSet<usize> = HashSet::new();
    let mut visited: HashSet<Token> = HashSet::from([input.clone()]);

    while let Some(frame) = stack.last_mut() {
        let edges = adjacency.get(&frame.token).map(Vec::as_slice).unwrap_or(&[]);

        let Some(&pair_index) = edges.get(frame.next_edge) else {
            // exhausted this token, step back
            let done = stack.pop();
            if let Some(done) = done {
                visited.remove(&done.token);
            }
            if let Some(index) = used_pairs.pop() {
                used_set.remove(&index);
            }
            continue;
        };
        frame.next_edge += 1;

        if used_set.contains(&pair_index) {
            continue;
        }
        let pair = &pairs[pair_index];
        let Some(next) = pair.other(&frame.token) else {
            continue;
        };

        if next == output {
            let mut route_pairs: Vec<Pair> =
                used_pairs.iter().map(|&i| pairs[i].clone()).collect();
            route_pairs.push(pair.clone());
            match Route::new(route_pairs, input.clone(), Some(output.clone())) {
                Ok(route) => routes.push(route),
                Err(e) => tracing::debug!(error = %e, "Skipping inconsistent route"),
            }
            continue;
        }

        if used_pairs.len() + 1 >= max_hops || visited.contains(next) {
            continue;
        }

        let next = next.clone();
        used_pairs.push(pair_index);
        used_set.insert(pair_index);
        visited.insert(next.clone());
        stack.push(Frame {
            token: next,
            next_edge: 0,
        });
    }

    tracing::debug!(
        input = %input,
        output = %output,
        pairs = pairs.len(),
        routes = routes.len(),
        "Enumerated routes"
    );
    routes
}
