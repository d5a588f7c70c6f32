use cvrag_indexer::Ingestor;
use cvrag_text_chunker::{Chunker, ChunkerConfig};
use cvrag_vector_store::{Embedder, StubEmbedder, VectorIndex};
use std::sync::Arc;
use tempfile::TempDir;

const CV: &str = "Jane Doe\nSenior Rust engineer\n\nExperience\nBuilt storage engines at Acme.\n\
Led the search infrastructure team.\n\nSkills\nSkilled in Python, Go, and Rust.\n";

#[tokio::test]
async fn ingested_chunks_survive_reopen_and_are_queryable() {
    let temp = TempDir::new().expect("tempdir");
    let data_dir = temp.path().join("data");
    let index_dir = temp.path().join("index");
    tokio::fs::create_dir_all(&data_dir).await.expect("mkdir data");
    tokio::fs::write(data_dir.join("cv.txt"), CV)
        .await
        .expect("write cv");

    let embedder = Arc::new(StubEmbedder::new(32));
    let chunker = Chunker::new(ChunkerConfig::new(48, 8)).expect("chunker");

    let ids = {
        let index = Arc::new(
            VectorIndex::open(&index_dir, "cv_chunks")
                .await
                .expect("open index"),
        );
        let ingestor = Ingestor::new(chunker.clone(), embedder.clone(), index.clone())
            .with_concurrency(2);
        let report = ingestor.ingest_dir(&data_dir).await.expect("ingest");
        assert_eq!(report.documents, 1);
        assert!(report.chunks > 1, "expected several chunks: {report:?}");
        drop(ingestor);
        Arc::try_unwrap(index)
            .ok()
            .expect("sole owner")
            .close()
            .expect("close");
        report.ids
    };

    let index = VectorIndex::open(&index_dir, "cv_chunks")
        .await
        .expect("reopen index");
    assert_eq!(index.len().await, ids.len());

    // The stub embedder maps identical text to identical vectors, so a chunk
    // queried by its own text ranks first.
    let records = index.records().await;
    let target = &records[records.len() - 1];
    let query = embedder.embed(&target.text).await.expect("embed query");
    let result = index.query(&query, 3).await.expect("query");
    assert_eq!(result.len(), 3.min(records.len()));
    assert_eq!(result.hits[0].id, target.id);
    assert!((result.hits[0].score - 1.0).abs() < 1e-5);
}
