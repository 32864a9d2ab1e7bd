//! Non-manifold vertex (pinch point / bowtie) detection.
//!
//! A vertex is non-manifold when its incident faces form two or more
//! disjoint fans around it. The test builds the vertex's link graph, whose
//! nodes are the other vertices of each incident triangle with an edge
//! between them per triangle, and checks whether a BFS from one node reaches
//! all of them.

use hashbrown::HashMap;
use tracing::debug;

use crate::types::MeshBuffers;

/// Find all non-manifold vertices, in ascending vertex order.
///
/// Vertices with fewer than two incident triangles are never reported.
pub fn detect_pinch_vertices(mesh: &MeshBuffers, vertex_faces: &[Vec<u32>]) -> Vec<u32> {
    let mut pinched = Vec::new();

    for (v, faces) in vertex_faces.iter().enumerate() {
        if faces.len() < 2 {
            continue;
        }
        if !link_is_connected(mesh, v as u32, faces) {
            pinched.push(v as u32);
        }
    }

    if !pinched.is_empty() {
        debug!("found {} pinch vertices", pinched.len());
    }

    pinched
}

/// BFS over the link graph of `v`; true iff a single fan covers every node.
fn link_is_connected(mesh: &MeshBuffers, v: u32, faces: &[u32]) -> bool {
    // Node ids for the link vertices, discovered in triangle order.
    let mut node_of: HashMap<u32, usize> = HashMap::with_capacity(faces.len() * 2);
    let mut neighbors: Vec<Vec<usize>> = Vec::with_capacity(faces.len() * 2);

    let mut node = |vertex: u32, neighbors: &mut Vec<Vec<usize>>| -> usize {
        *node_of.entry(vertex).or_insert_with(|| {
            neighbors.push(Vec::new());
            neighbors.len() - 1
        })
    };

    for &t in faces {
        let [i0, i1, i2] = mesh.tri(t as usize);
        let (a, b) = match (i0 == v, i1 == v, i2 == v) {
            (true, _, _) => (i1, i2),
            (_, true, _) => (i2, i0),
            _ => (i0, i1),
        };
        let na = node(a, &mut neighbors);
        let nb = node(b, &mut neighbors);
        neighbors[na].push(nb);
        neighbors[nb].push(na);
    }

    let node_count = neighbors.len();
    if node_count == 0 {
        return true;
    }

    let mut visited = vec![false; node_count];
    let mut queue = vec![0usize];
    visited[0] = true;
    let mut reached = 1;

    while let Some(n) = queue.pop() {
        for &next in &neighbors[n] {
            if !visited[next] {
                visited[next] = true;
                reached += 1;
                queue.push(next);
            }
        }
    }

    reached == node_count
}
