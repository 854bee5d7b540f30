//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use islgen::cassette::recorder::CassetteRecorder;

pub const DOMAIN_SIGNATURE: &str = "export function Card(id: number): { id: number, open: boolean }";

pub fn domain_reply() -> String {
    format!(
        "#[CODE]\nexport const Card = (id) => ({{ id, open: false }});\n#[CODE-END]\n\
         #[SIGNATURE]\n{DOMAIN_SIGNATURE}\n#[SIGNATURE-END]"
    )
}

pub const BOARD_REPLY: &str = "#[CODE]\n```jsx\nimport { Card } from './domain';\n\
                               export default function Board() { return null; }\n```\n#[CODE-END]\n\
                               #[SIGNATURE]\nexport default function Board(): JSX.Element\n\
                               #[SIGNATURE-END]";

/// Lay out `<root>/build/{build-manifest.json, *.build.md}` for a two-entry
/// project where `board` depends on `domain`. Returns the manifest path.
pub fn write_project(root: &Path) -> PathBuf {
    let build = root.join("build");
    fs::create_dir_all(&build).unwrap();
    fs::write(
        build.join("domain.build.md"),
        "<!-- SOURCE FILE TO IMPLEMENT -->\n# Domain\n**Role**: Domain\n",
    )
    .unwrap();
    fs::write(
        build.join("board.build.md"),
        "<!-- START DEPENDENCY INTERFACE: domain.ref.md -->\n\
         <!-- IMPLEMENTATION PATH: ./domain -->\n\
         **Role**: Domain\n\
         <!-- END DEPENDENCY INTERFACE -->\n\
         <!-- SOURCE FILE TO IMPLEMENT -->\n# Board\n**Role**: Presentation\n",
    )
    .unwrap();

    let manifest = build.join("build-manifest.json");
    let entries = json!([
        {"sourceFile": root.join("domain.isl.md"), "buildFile": "domain.build.md",
         "implementationPath": "./domain", "hash": "d1"},
        {"sourceFile": root.join("board.isl.md"), "buildFile": "board.build.md",
         "implementationPath": "./board", "hash": "b1"},
    ]);
    fs::write(&manifest, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    manifest
}

/// Write `<dir>/llm.cassette.yaml` answering with `replies` in order.
pub fn write_llm_cassette(dir: &Path, replies: &[&str]) -> PathBuf {
    let path = dir.join("llm.cassette.yaml");
    let mut recorder = CassetteRecorder::new(&path, "islgen-llm");
    for reply in replies {
        recorder.record(
            "llm",
            "complete",
            json!({}),
            json!({"ok": {"text": reply, "prompt_tokens": 100, "completion_tokens": 50}}),
        );
    }
    recorder.finish().unwrap()
}
