// tests/common/mod.rs

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use gbwtgraph::{gfa_to_gbwt, GbwtGraph, GfaParsingParameters};
use tempfile::NamedTempFile;

/// Two components: a chain with a bubble over nodes 11 to 17, and a cycle
/// over nodes 21 to 25. The links are not used for building the graph.
pub const COMPONENTS_GFA: &str = "\
H\tVN:Z:1.0
S\t11\tG
S\t12\tA
S\t13\tT
S\t14\tT
S\t15\tA
S\t16\tC
S\t17\tA
S\t21\tA
S\t22\tA
S\t23\tA
S\t24\tT
S\t25\tA
L\t11\t+\t12\t+\t0M
L\t12\t+\t13\t+\t0M
L\t12\t+\t14\t+\t0M
L\t13\t+\t15\t+\t0M
L\t14\t+\t15\t+\t0M
L\t15\t+\t16\t+\t0M
L\t16\t+\t17\t+\t0M
L\t21\t+\t22\t+\t0M
L\t22\t+\t23\t+\t0M
L\t23\t+\t24\t+\t0M
L\t24\t+\t25\t+\t0M
L\t25\t+\t21\t+\t0M
P\tA#1#chain\t11+,12+,13+,15+,16+,17+\t*
P\tB#1#chain\t11+,12+,14+,15+,16+,17+\t*
P\tA#1#cycle\t21+,22+,23+,24+,25+,21+\t*
";

/// Nodes 1 to 9 with a cycle 5 -> 6 -> 8 -> 5.
pub const CYCLIC_GFA: &str = "\
H\tVN:Z:1.0
S\t1\tGATT
S\t2\tA
S\t3\tC
S\t4\tA
S\t5\tGG
S\t6\tT
S\t7\tA
S\t8\tC
S\t9\tTACA
P\tfirst\t1+,2+,4+,5+,6+,8+,9+\t*
P\tsecond\t1+,2+,3+,4+,6+,7+,9+\t*
P\tthird\t4+,5+,6+,8+,5+,6+,7+,9+\t*
";

/// Writes the contents into a temporary file with a `.gfa` extension.
pub fn write_gfa(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".gfa")
        .tempfile()
        .expect("Failed to create temporary file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write GFA");
    file.flush().expect("Failed to flush GFA");
    file
}

pub fn build_graph(contents: &str, params: &GfaParsingParameters) -> GbwtGraph {
    let file = write_gfa(contents);
    let (index, source) = gfa_to_gbwt(file.path(), params).expect("Construction failed");
    GbwtGraph::new(Arc::new(index), Arc::new(source))
}
