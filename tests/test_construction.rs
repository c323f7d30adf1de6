// tests/test_construction.rs

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use gbwtgraph::{
    gfa_to_gbwt, is_nice_and_acyclic, topological_order, weakly_connected_components, GbwtGraph,
    GfaParsingParameters, GraphError, Handle,
};

use common::{build_graph, write_gfa, COMPONENTS_GFA, CYCLIC_GFA};

fn params() -> GfaParsingParameters {
    GfaParsingParameters::default()
}

fn expect_parse_error(contents: &str, params: &GfaParsingParameters) -> (Option<usize>, String) {
    let file = write_gfa(contents);
    match gfa_to_gbwt(file.path(), params) {
        Err(GraphError::Parse { line, message }) => (line, message),
        Err(other) => panic!("Expected a parse error, got {}", other),
        Ok(_) => panic!("Expected a parse error, construction succeeded"),
    }
}

#[test]
fn test_numeric_ids_with_gaps_are_kept() {
    let file = write_gfa(COMPONENTS_GFA);
    let (index, source) = gfa_to_gbwt(file.path(), &params()).unwrap();
    assert!(!source.uses_translation());
    assert_eq!(source.nodes(), 12);
    assert_eq!(index.paths(), 3);
    assert_eq!(index.sequences(), 6);
    assert_eq!(
        index.path(0),
        [11, 12, 13, 15, 16, 17].map(Handle::forward).to_vec()
    );
}

#[test]
fn test_paths_are_stored_in_both_orientations() {
    let file = write_gfa(CYCLIC_GFA);
    let (index, _) = gfa_to_gbwt(file.path(), &params()).unwrap();
    let third: Vec<Handle> = [4, 5, 6, 8, 5, 6, 7, 9].map(Handle::forward).to_vec();
    assert_eq!(index.path(2), third);
    let reverse: Vec<Handle> = index.sequence(5).map(Handle::from_gbwt).collect();
    let expected: Vec<Handle> = third.iter().rev().map(|h| h.flip()).collect();
    assert_eq!(reverse, expected);

    let mut pos = index.start(4);
    while let Some(p) = pos {
        assert_eq!(index.locate(p), Some(4));
        pos = index.forward(p);
    }
}

#[test]
fn test_long_segment_is_chopped() {
    let long = "A".repeat(100) + &"C".repeat(100) + &"G".repeat(100);
    let contents = format!(
        "S\tlong\t{}\nS\tshort\tTT\nP\tforward\tlong+,short+\t*\nP\treverse\tshort-,long-\t*\n",
        long
    );
    let params = GfaParsingParameters {
        max_node_length: 100,
        ..GfaParsingParameters::default()
    };
    let graph = build_graph(&contents, &params);
    let source = graph.sequence_source();
    assert!(source.uses_translation());
    assert_eq!(source.get_translation("long"), Some(1..4));
    assert_eq!(source.get_translation("short"), Some(4..5));
    assert_eq!(source.node_to_segment(3), Some(("long".to_string(), 200)));
    assert_eq!(source.get_sequence(2), Some("C".repeat(100).as_bytes()));

    let index = graph.index();
    assert_eq!(
        index.path(0),
        vec![
            Handle::forward(1),
            Handle::forward(2),
            Handle::forward(3),
            Handle::forward(4)
        ]
    );
    assert_eq!(
        index.path(1),
        vec![
            Handle::reverse(4),
            Handle::reverse(3),
            Handle::reverse(2),
            Handle::reverse(1)
        ]
    );
    assert_eq!(
        graph.get_sequence(Handle::reverse(1)),
        Some("T".repeat(100).into_bytes())
    );
    assert_eq!(graph.get_segment(2), Some(("long".to_string(), 100)));
}

#[test]
fn test_string_names_are_translated() {
    let contents = "\
S\ts1\tGAT
S\ts2\t*\tLN:i:4
S\t3\tC
P\tx\ts1+,s2+,3+\t*
";
    let graph = build_graph(contents, &params());
    let source = graph.sequence_source();
    assert!(source.uses_translation());
    assert_eq!(source.get_translation("s1"), Some(1..2));
    assert_eq!(source.get_translation("3"), Some(3..4));
    assert_eq!(graph.get_sequence(Handle::forward(2)), Some(b"NNNN".to_vec()));
    assert_eq!(weakly_connected_components(&graph), vec![vec![1, 2, 3]]);
}

#[test]
fn test_path_name_fields() {
    let contents = "\
S\t1\tA
S\t2\tC
P\tHG002#1#chr20\t1+,2+\t*
P\tHG002#2#chr20\t1+,2-\t*
P\tGRCh38#0#chr20\t2-,1-\t*
";
    let params = GfaParsingParameters {
        path_name_regex: "(.*)#(.*)#(.*)".to_string(),
        path_name_fields: "XSHC".to_string(),
        ..GfaParsingParameters::default()
    };
    let graph = build_graph(contents, &params);
    let metadata = graph.index().metadata();
    assert_eq!(metadata.paths(), 3);
    assert_eq!(metadata.samples(), 2);
    assert_eq!(metadata.contigs(), 1);
    assert_eq!(metadata.haplotypes(), 3);
    let name = metadata.path(1).unwrap();
    assert_eq!(metadata.sample_name(name.sample), Some("HG002"));
    assert_eq!(metadata.contig_name(name.contig), Some("chr20"));
    assert_eq!(name.haplotype, 2);
    assert_eq!(name.fragment, 0);
}

#[test]
fn test_unmapped_sample_is_the_path_name() {
    let contents = "S\t1\tA\nS\t2\tC\nP\tA#chr1\t1+,2+\t*\nP\tB#chr1\t2-,1-\t*\n";
    let params = GfaParsingParameters {
        path_name_regex: "(.*)#(.*)".to_string(),
        path_name_fields: "xxc".to_string(),
        ..GfaParsingParameters::default()
    };
    let graph = build_graph(contents, &params);
    let metadata = graph.index().metadata();
    assert_eq!(metadata.paths(), 2);
    assert_eq!(metadata.contigs(), 1);
    for (id, expected) in ["A#chr1", "B#chr1"].into_iter().enumerate() {
        let name = metadata.path(id).unwrap();
        assert_eq!(metadata.sample_name(name.sample), Some(expected));
        assert_eq!(metadata.contig_name(name.contig), Some("chr1"));
    }
}

#[test]
fn test_sparse_numeric_ids_are_translated() {
    let contents = "S\t100000000000\tGA\nS\t5\tT\nP\tx\t100000000000+,5+\t*\n";
    let graph = build_graph(contents, &params());
    let source = graph.sequence_source();
    assert!(source.uses_translation());
    assert_eq!(source.get_translation("100000000000"), Some(1..2));
    assert_eq!(source.get_translation("5"), Some(2..3));
    assert_eq!(graph.get_node_count(), 2);
    assert_eq!(graph.get_segment(1), Some(("100000000000".to_string(), 0)));
}

#[test]
fn test_many_paths() {
    let mut contents = String::from("S\t1\tA\nS\t2\tC\nS\t3\tG\nS\t4\tT\n");
    let paths = 3000;
    for i in 0..paths {
        let steps = if i % 2 == 0 { "1+,2+,4+" } else { "1+,3+,4+" };
        contents.push_str(&format!("P\tpath{}\t{}\t*\n", i, steps));
    }
    let params = GfaParsingParameters {
        batch_size: 1000,
        sample_interval: 2,
        ..GfaParsingParameters::default()
    };
    let graph = build_graph(&contents, &params);
    let index = graph.index();
    assert_eq!(index.paths(), paths);
    assert_eq!(index.len(), 2 * paths * 4);
    for id in [0, 1, 999, 1000, 2998, 2999] {
        let middle = if id % 2 == 0 { 2 } else { 3 };
        assert_eq!(
            index.path(id),
            vec![Handle::forward(1), Handle::forward(middle), Handle::forward(4)]
        );
        let mut pos = index.start(2 * id + 1);
        while let Some(p) = pos {
            assert_eq!(index.locate(p), Some(2 * id + 1));
            pos = index.forward(p);
        }
    }
    assert_eq!(weakly_connected_components(&graph), vec![vec![1, 2, 3, 4]]);
}

#[test]
fn test_walks() {
    let contents = "\
S\t1\tA
S\t2\tC
S\t3\tG
W\tNA12878\t1\tchr1\t0\t3\t>1>2>3
W\tNA12878\t2\tchr1\t5\t8\t<3<2<1
P\tref\t1+,3+\t*
";
    let graph = build_graph(contents, &params());
    let index = graph.index();
    let metadata = index.metadata();
    assert_eq!(metadata.paths(), 3);
    let second = metadata.path(1).unwrap();
    assert_eq!(metadata.sample_name(second.sample), Some("NA12878"));
    assert_eq!(second.haplotype, 2);
    assert_eq!(second.fragment, 5);
    assert_eq!(
        index.path(1),
        vec![Handle::reverse(3), Handle::reverse(2), Handle::reverse(1)]
    );
    let right: Vec<Handle> = graph.edges(Handle::forward(1), false).collect();
    assert_eq!(right, vec![Handle::forward(2), Handle::forward(3)]);
}

#[test]
fn test_configuration_errors_come_first() {
    let missing = "/nonexistent/graph.gfa";
    let bad_fields = GfaParsingParameters {
        path_name_fields: "SS".to_string(),
        ..GfaParsingParameters::default()
    };
    assert!(matches!(
        gfa_to_gbwt(missing, &bad_fields),
        Err(GraphError::Config(_))
    ));

    let bad_regex = GfaParsingParameters {
        path_name_regex: "(unclosed".to_string(),
        ..GfaParsingParameters::default()
    };
    assert!(matches!(
        gfa_to_gbwt(missing, &bad_regex),
        Err(GraphError::Config(_))
    ));

    let too_many_fields = GfaParsingParameters {
        path_name_regex: "(.*)".to_string(),
        path_name_fields: "SCH".to_string(),
        ..GfaParsingParameters::default()
    };
    assert!(matches!(
        gfa_to_gbwt(missing, &too_many_fields),
        Err(GraphError::Config(_))
    ));

    let zero_batch = GfaParsingParameters {
        batch_size: 0,
        ..GfaParsingParameters::default()
    };
    assert!(matches!(
        gfa_to_gbwt(missing, &zero_batch),
        Err(GraphError::Config(_))
    ));

    assert!(matches!(
        gfa_to_gbwt(missing, &params()),
        Err(GraphError::Io(_))
    ));
}

#[test]
fn test_node_width_overflow() {
    let narrow = GfaParsingParameters {
        node_width: 4,
        ..GfaParsingParameters::default()
    };
    let file = write_gfa("S\t1\tA\nS\t9\tC\nP\tx\t1+,9+\t*\n");
    match gfa_to_gbwt(file.path(), &narrow) {
        Err(GraphError::Config(message)) => {
            assert!(message.contains("4 bits"), "Unexpected message: {}", message)
        }
        Err(other) => panic!("Expected a configuration error, got {}", other),
        Ok(_) => panic!("Expected a configuration error, construction succeeded"),
    }
}

#[test]
fn test_unknown_segment() {
    let contents = "S\t1\tA\nS\t2\tC\nP\tx\t1+,2+\t*\nP\ty\t1+,7+\t*\n";
    let (line, message) = expect_parse_error(contents, &params());
    assert_eq!(line, Some(4));
    assert!(message.contains('7'), "Unexpected message: {}", message);
}

#[test]
fn test_segment_without_length() {
    let contents = "S\t1\tA\nS\t2\t*\nP\tx\t1+,2+\t*\n";
    let (line, _) = expect_parse_error(contents, &params());
    assert_eq!(line, Some(2));
}

#[test]
fn test_duplicate_segment() {
    let contents = "S\t1\tA\nS\t1\tC\nP\tx\t1+\t*\n";
    let (line, _) = expect_parse_error(contents, &params());
    assert_eq!(line, Some(2));
}

#[test]
fn test_duplicate_path_name() {
    let contents = "S\t1\tA\nS\t2\tC\nP\tx#1\t1+\t*\nP\tx#1\t2+\t*\n";
    let params = GfaParsingParameters {
        path_name_regex: "(.*)#(.*)".to_string(),
        path_name_fields: "XSH".to_string(),
        ..GfaParsingParameters::default()
    };
    let (line, _) = expect_parse_error(contents, &params);
    assert_eq!(line, Some(4));
}

#[test]
fn test_path_name_does_not_match() {
    let contents = "S\t1\tA\nP\tplain\t1+\t*\n";
    let params = GfaParsingParameters {
        path_name_regex: "(.*)#(.*)".to_string(),
        path_name_fields: "XSH".to_string(),
        ..GfaParsingParameters::default()
    };
    let (line, _) = expect_parse_error(contents, &params);
    assert_eq!(line, Some(2));
}

#[test]
fn test_empty_file() {
    let file = write_gfa("");
    assert!(gfa_to_gbwt(file.path(), &params()).is_err());
}

#[test]
fn test_construction_is_deterministic() {
    let small_batches = GfaParsingParameters {
        batch_size: 3,
        sample_interval: 2,
        show_progress: false,
        ..GfaParsingParameters::default()
    };
    for contents in [COMPONENTS_GFA, CYCLIC_GFA] {
        let file = write_gfa(contents);
        let (first, _) = gfa_to_gbwt(file.path(), &params()).unwrap();
        let (second, _) = gfa_to_gbwt(file.path(), &params()).unwrap();
        assert_eq!(first, second);
        let with_progress = GfaParsingParameters {
            batch_size: 1,
            show_progress: true,
            ..GfaParsingParameters::default()
        };
        let (third, _) = gfa_to_gbwt(file.path(), &with_progress).unwrap();
        assert_eq!(first, third);

        let a = build_graph(contents, &params());
        let b = build_graph(contents, &small_batches);
        let components = weakly_connected_components(&a);
        assert_eq!(components, weakly_connected_components(&b));
        for component in &components {
            assert_eq!(
                is_nice_and_acyclic(&a, component),
                is_nice_and_acyclic(&b, component)
            );
            let subgraph: HashSet<usize> = component.iter().copied().collect();
            assert_eq!(
                topological_order(&a, &subgraph),
                topological_order(&b, &subgraph)
            );
        }
    }
}

#[test]
fn test_graph_shares_the_index() {
    let file = write_gfa(CYCLIC_GFA);
    let (index, source) = gfa_to_gbwt(file.path(), &params()).unwrap();
    let index = Arc::new(index);
    let source = Arc::new(source);
    let first = GbwtGraph::new(Arc::clone(&index), Arc::clone(&source));
    let second = GbwtGraph::new(index, source);
    assert_eq!(first.get_node_count(), 9);
    assert_eq!(
        weakly_connected_components(&first),
        weakly_connected_components(&second)
    );
}
