//! Cypher statements issued on association changes.

/// Quote `s` as a single-quoted Cypher string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Replace the AGV's `CONNECTED_TO` relationship with one to `station`.
///
/// ```text
/// MATCH (agv:AGV {id: 'AGV-1001'})
/// OPTIONAL MATCH (agv)-[r:CONNECTED_TO]->()
/// DELETE r
/// WITH agv
/// MATCH (gnb:gNodeB {id: 'gNodeB-2'})
/// MERGE (agv)-[:CONNECTED_TO]->(gnb)
/// ```
pub fn connect_agv(agv: &str, station: &str) -> String {
    format!(
        "MATCH (agv:AGV {{id: {agv}}}) \
         OPTIONAL MATCH (agv)-[r:CONNECTED_TO]->() \
         DELETE r \
         WITH agv \
         MATCH (gnb:gNodeB {{id: {gnb}}}) \
         MERGE (agv)-[:CONNECTED_TO]->(gnb)",
        agv = quote(agv),
        gnb = quote(station),
    )
}
