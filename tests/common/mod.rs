//! Shared helpers for integration tests

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_sign_server::storage::{AuditSink, MemoryAuditLog};
use pdf_sign_server::{build_router, ServerConfig, SignClient, SigningService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// One-page PDF of the given size with a line of text on it
pub fn sample_pdf(width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 18.into()]),
            Operation::new("Td", vec![72.into(), 72.into()]),
            Operation::new("Tj", vec![Object::string_literal("Please sign")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save sample pdf");
    bytes
}

/// Content operations of the first page of a document
pub fn first_page_operations(bytes: &[u8]) -> Vec<Operation> {
    let doc = Document::load_mem(bytes).expect("load stamped pdf");
    let page_id = *doc.get_pages().values().next().expect("first page");
    let content = doc.get_page_content(page_id).expect("page content");
    Content::decode(&content).expect("decode content").operations
}

/// Numeric operands of an operation
pub fn operands(op: &Operation) -> Vec<f64> {
    op.operands
        .iter()
        .map(|o| o.as_float().expect("numeric operand") as f64)
        .collect()
}

/// The router served on an ephemeral port over a temporary uploads root
pub struct TestServer {
    pub addr: SocketAddr,
    pub uploads: TempDir,
    pub audit: Arc<MemoryAuditLog>,
    pub client: SignClient,
    http: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        let audit = Arc::new(MemoryAuditLog::new());
        let uploads = tempfile::tempdir().expect("create uploads dir");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        let config = ServerConfig {
            port: addr.port(),
            uploads_dir: uploads.path().to_path_buf(),
            audit_log: None,
            public_base_url: format!("http://{}", addr),
            ..ServerConfig::default()
        };
        let sink: Arc<dyn AuditSink> = audit.clone();
        let app = build_router(SigningService::new(config, sink));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = format!("http://{}", addr);
        Self {
            addr,
            uploads,
            audit,
            client: SignClient::new(&base).expect("sign client"),
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Store an original document under `id`
    pub fn put_original(&self, id: &str, bytes: &[u8]) {
        let dir = self.uploads.path().join("original");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(id), bytes).unwrap();
    }

    pub fn signed_path(&self, id: &str) -> PathBuf {
        self.uploads
            .path()
            .join("signed")
            .join(format!("signed-{}", id))
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Download a file the server exposes by URL
    pub async fn download(&self, url: &str) -> Vec<u8> {
        let response = self.http.get(url).send().await.expect("download");
        assert!(response.status().is_success(), "GET {} failed", url);
        response.bytes().await.expect("body").to_vec()
    }
}
