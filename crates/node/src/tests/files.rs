use std::fs;

use camino::Utf8PathBuf;
use hornet_primitives::LeafType;
use tempfile::TempDir;

use super::*;

fn workspace() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("temp dir is created");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp path is utf-8");

    (dir, path)
}

#[test]
fn directory_becomes_a_verified_dag() {
    let (_guard, base) = workspace();
    let root = base.join("album");

    fs::create_dir_all(root.join("raw")).expect("dirs are created");
    fs::write(root.join("cover.jpg"), b"jpeg").expect("file is written");
    fs::write(root.join("raw/track.mp3"), vec![7_u8; 10]).expect("file is written");

    let dag = dag_from_path(&root, 4).expect("dag builds");

    dag.verify().expect("dag verifies");

    let root_leaf = dag.root_leaf().expect("root is present");
    assert_eq!(root_leaf.item_name, "album");
    assert_eq!(root_leaf.leaf_type, LeafType::Directory);
    assert_eq!(root_leaf.links.len(), 2);

    let track = dag
        .leaves
        .values()
        .find(|leaf| leaf.item_name == "track.mp3")
        .expect("track is in the dag");
    assert_eq!(track.leaf_type, LeafType::File);
    assert_eq!(track.links.len(), 3);
    assert!(track.content.is_none());
}

#[test]
fn written_dag_matches_the_source_tree() {
    let (_guard, base) = workspace();
    let source = base.join("docs");

    fs::create_dir_all(source.join("nested")).expect("dirs are created");
    fs::write(source.join("readme.md"), b"hello world").expect("file is written");
    fs::write(source.join("nested/empty.txt"), b"").expect("file is written");

    let dag = dag_from_path(&source, 3).expect("dag builds");

    let dest = base.join("out");
    fs::create_dir_all(&dest).expect("dest is created");
    write_dag(&dag, &dest).expect("dag is written");

    assert_eq!(
        fs::read(dest.join("docs/readme.md")).expect("readme exists"),
        b"hello world"
    );
    assert_eq!(
        fs::read(dest.join("docs/nested/empty.txt")).expect("empty file exists"),
        b""
    );
}

#[test]
fn single_large_file_is_chunked_under_the_root() {
    let (_guard, base) = workspace();
    let file = base.join("movie.mkv");
    fs::write(&file, vec![1_u8; 25]).expect("file is written");

    let dag = dag_from_path(&file, 10).expect("dag builds");

    dag.verify().expect("dag verifies");
    assert_eq!(dag.len(), 4);

    let root = dag.root_leaf().expect("root is present");
    assert_eq!(root.leaf_type, LeafType::File);
    assert_eq!(root.links.len(), 3);
}

#[test]
fn contentless_leaves_cannot_be_written() {
    let (_guard, base) = workspace();
    let file = base.join("notes.txt");
    fs::write(&file, b"notes").expect("file is written");

    let mut dag = dag_from_path(&file, DEFAULT_CHUNK_SIZE).expect("dag builds");
    for leaf in dag.leaves.values_mut() {
        leaf.content = None;
    }

    let dest = base.join("out");
    fs::create_dir_all(&dest).expect("dest is created");

    let err = write_dag(&dag, &dest).expect_err("content is required");
    assert!(err.to_string().contains("without content"), "{err}");
}
