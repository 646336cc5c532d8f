//! End-to-end pipeline tests over mocked upstreams
//!
//! Every source endpoint is served by wiremock from the bundled samples, so
//! these tests exercise the full chain - download, cache, truncation,
//! resolution, provenance, writer - without the network.

use bkg_pipeline::adapter::{Adapter, AdapterConfig, Threshold};
use bkg_pipeline::curie::IdNormalizer;
use bkg_pipeline::pipeline::PipelineStats;
use bkg_pipeline::sources::chembl::parser::{
    SAMPLE_ACTIVITIES_TSV, SAMPLE_INDICATIONS_TSV, SAMPLE_MOLECULES_TSV,
};
use bkg_pipeline::sources::disease::parser::SAMPLE_OBO;
use bkg_pipeline::sources::opentargets::parser::SAMPLE_ASSOCIATIONS;
use bkg_pipeline::sources::side_effect::SAMPLE_FREQUENCIES;
use bkg_pipeline::sources::string_db::parser::SAMPLE_LINKS;
use bkg_pipeline::sources::uniprot::parser::SAMPLE_TSV;
use bkg_pipeline::sources::{
    ChemblAdapter, DiseaseAdapter, OpenTargetsAdapter, SideEffectAdapter, StringAdapter,
    UniprotAdapter,
};
use bkg_pipeline::{GraphWriter, Pipeline};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// Serve every upstream export from the bundled samples
async fn mock_all_upstreams() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/uniprot/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_TSV))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/string/.*\.txt\.gz$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(SAMPLE_LINKS)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/opentargets/associations.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_ASSOCIATIONS))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mondo/mondo.obo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_OBO))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/chembl/chembl_34_molecules\.tsv\.gz$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(SAMPLE_MOLECULES_TSV)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/chembl/chembl_34_activities\.tsv\.gz$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(SAMPLE_ACTIVITIES_TSV)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/chembl/chembl_34_drug_indications\.tsv\.gz$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(SAMPLE_INDICATIONS_TSV)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sider/meddra_freq.tsv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(SAMPLE_FREQUENCIES)))
        .mount(&server)
        .await;

    server
}

/// Build the full adapter set against the mock server's uri, wiring the
/// disease crosswalk the way the CLI does
async fn build_adapters(uri: &str, config: &AdapterConfig) -> Vec<Box<dyn Adapter>> {
    let mut disease = DiseaseAdapter::new(config.clone())
        .unwrap()
        .with_ontology_url(format!("{}/mondo/mondo.obo", uri));
    disease.download().await.unwrap();
    let crosswalk = disease.crosswalk();

    let uniprot = UniprotAdapter::new(config.clone())
        .unwrap()
        .with_stream_url(format!("{}/uniprot/stream", uri));

    let mut string_config = config.clone();
    string_config.threshold = Some(Threshold::Score(700.0));
    let string = StringAdapter::new(string_config)
        .unwrap()
        .with_links_base_url(format!("{}/string", uri))
        .with_xref_base_url(format!("{}/uniprot/stream", uri));

    let mut ot_config = config.clone();
    ot_config.threshold = Some(Threshold::Score(0.1));
    let opentargets = OpenTargetsAdapter::new(ot_config)
        .unwrap()
        .with_associations_url(format!("{}/opentargets/associations.json", uri))
        .with_xref_base_url(format!("{}/uniprot/stream", uri))
        .with_crosswalk(crosswalk.clone());

    let chembl = ChemblAdapter::new(config.clone())
        .unwrap()
        .with_bulk_base_url(format!("{}/chembl", uri))
        .with_api_base_url(format!("{}/chembl-api", uri))
        .with_crosswalk(crosswalk);

    let side_effect = SideEffectAdapter::new(config.clone())
        .unwrap()
        .with_frequencies_url(format!("{}/sider/meddra_freq.tsv.gz", uri));

    vec![
        Box::new(uniprot),
        Box::new(disease),
        Box::new(string),
        Box::new(opentargets),
        Box::new(chembl),
        Box::new(side_effect),
    ]
}

async fn run_once(server: &MockServer, cache_dir: &Path, output_dir: &Path) -> PipelineStats {
    let config = AdapterConfig::builder()
        .cache_dir(cache_dir)
        .max_retries(1)
        .build();

    let adapters = build_adapters(&server.uri(), &config).await;
    let pipeline = Pipeline::new(GraphWriter::new(output_dir));
    pipeline.run(adapters).await.unwrap()
}

fn read_sorted_outputs(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();

    files
        .into_iter()
        .map(|path| {
            (
                path.file_name().unwrap().to_string_lossy().to_string(),
                std::fs::read_to_string(&path).unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_full_pipeline_writes_all_labels() {
    let server = mock_all_upstreams().await;
    let cache = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let stats = run_once(&server, cache.path(), output.path()).await;

    assert!(stats.failed_adapters().is_empty());
    assert!(stats.writer.nodes_written > 0);
    assert!(stats.writer.edges_written > 0);

    for label in [
        "protein",
        "gene",
        "organism",
        "disease",
        "compound",
        "side_effect",
        "protein_protein_interaction",
        "gene_is_related_to_disease",
        "gene_encodes_protein",
        "protein_belongs_to_organism",
        "disease_is_a_disease",
        "compound_targets_protein",
        "drug_treats_disease",
        "drug_has_side_effect",
    ] {
        assert!(
            output.path().join(format!("{}-header.csv", label)).exists(),
            "missing header for {}",
            label
        );
        assert!(
            output.path().join(format!("{}-part000.csv", label)).exists(),
            "missing part file for {}",
            label
        );
    }
}

#[tokio::test]
async fn test_every_audit_is_consistent() {
    let server = mock_all_upstreams().await;
    let cache = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let stats = run_once(&server, cache.path(), output.path()).await;

    let audited: Vec<_> = stats.adapters.iter().filter_map(|a| a.audit).collect();
    assert!(!audited.is_empty());
    for audit in audited {
        assert!(audit.is_consistent(), "inconsistent audit: {}", audit);
    }
}

#[tokio::test]
async fn test_edge_endpoints_are_valid_curies() {
    // Dangling endpoints are allowed; syntactically invalid ones are not
    let server = mock_all_upstreams().await;
    let cache = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    run_once(&server, cache.path(), output.path()).await;

    let normalizer = IdNormalizer::standard();
    for (name, content) in read_sorted_outputs(output.path()) {
        if !name.ends_with("-part000.csv") {
            continue;
        }
        for line in content.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            // Edge part files start with :START_ID and :END_ID columns
            if fields.len() >= 3 && fields[2].chars().all(|c| c.is_ascii_lowercase() || c == '_') {
                for endpoint in &fields[..2] {
                    if endpoint.contains(':') {
                        assert!(
                            normalizer.is_valid_curie(endpoint),
                            "invalid CURIE {} in {}",
                            endpoint,
                            name
                        );
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() {
    // Same cached dataset, test mode on: two independent runs must produce
    // identical tuple sequences all the way into the output files
    let server = mock_all_upstreams().await;
    let cache = tempfile::tempdir().unwrap();

    let output_a = tempfile::tempdir().unwrap();
    let output_b = tempfile::tempdir().unwrap();

    let run = |output: std::path::PathBuf| {
        let server_uri = server.uri();
        let cache = cache.path().to_path_buf();
        async move {
            let config = AdapterConfig::builder()
                .cache_dir(&cache)
                .test_mode(true)
                .max_retries(1)
                .build();

            let adapters = build_adapters(&server_uri, &config).await;
            let pipeline = Pipeline::new(GraphWriter::new(&output));
            pipeline.run(adapters).await.unwrap();
        }
    };

    run(output_a.path().to_path_buf()).await;
    run(output_b.path().to_path_buf()).await;

    let files_a = read_sorted_outputs(output_a.path());
    let files_b = read_sorted_outputs(output_b.path());

    assert_eq!(files_a.len(), files_b.len());
    for ((name_a, content_a), (name_b, content_b)) in files_a.iter().zip(files_b.iter()) {
        assert_eq!(name_a, name_b);
        assert_eq!(content_a, content_b, "output {} differs between runs", name_a);
    }
}

#[tokio::test]
async fn test_shared_edge_accumulates_sources() {
    // STRING and a second PPI assertion on the same endpoints end up as one
    // edge whose source list carries both
    let server = mock_all_upstreams().await;
    let cache = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let config = AdapterConfig::builder()
        .cache_dir(cache.path())
        .max_retries(1)
        .build();

    let string_a = StringAdapter::new(config.clone())
        .unwrap()
        .with_links_base_url(format!("{}/string", server.uri()))
        .with_xref_base_url(format!("{}/uniprot/stream", server.uri()));

    // A second adapter over the same links simulates another PPI source
    // asserting the same interactions
    let string_b = StringAdapter::new(config)
        .unwrap()
        .with_links_base_url(format!("{}/string", server.uri()))
        .with_xref_base_url(format!("{}/uniprot/stream", server.uri()));

    let pipeline = Pipeline::new(GraphWriter::new(output.path()));
    let stats = pipeline
        .run(vec![Box::new(string_a), Box::new(string_b)])
        .await
        .unwrap();

    assert!(stats.writer.merged_edges > 0);
    assert_eq!(stats.writer.edges_written * 2, stats.total_edges());
}

#[tokio::test]
async fn test_sampler_bounds_flow_exactly() {
    // 500 raw interactions with a limit of 100: exactly 100 enter the
    // audited chain, run after run
    let server = MockServer::start().await;

    let mut links = String::from("protein1 protein2 combined_score\n");
    for i in 0..500 {
        links.push_str(&format!("9606.ENSP00000269305 9606.ENSP{:011} 900\n", i));
    }

    Mock::given(method("GET"))
        .and(path_regex(r"^/string/.*\.txt\.gz$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(&links)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uniprot/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_TSV))
        .mount(&server)
        .await;

    let cache = tempfile::tempdir().unwrap();
    let config = AdapterConfig::builder()
        .cache_dir(cache.path())
        .test_mode(true)
        .sample_limit(100)
        .max_retries(1)
        .build();

    for _ in 0..2 {
        let mut adapter = StringAdapter::new(config.clone())
            .unwrap()
            .with_links_base_url(format!("{}/string", server.uri()))
            .with_xref_base_url(format!("{}/uniprot/stream", server.uri()));
        adapter.download().await.unwrap();

        assert_eq!(adapter.audit().unwrap().total, 100);
    }
}
