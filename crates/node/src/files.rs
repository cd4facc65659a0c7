//! Converting between directory trees on disk and DAGs.

#[cfg(test)]
#[path = "tests/files.rs"]
mod tests;

use std::fs;

use camino::Utf8Path;
use eyre::{bail, eyre, OptionExt, Result as EyreResult, WrapErr};
use hornet_primitives::{Dag, DagBuilder, DagLeaf, DagLeafBuilder, LeafType};

/// Files larger than this are split into linked chunks.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Builds a DAG whose root is the file or directory at `path`.
pub fn dag_from_path(path: &Utf8Path, chunk_size: usize) -> EyreResult<Dag> {
    let name = path
        .file_name()
        .ok_or_else(|| eyre!("path has no file name: {path}"))?;

    let mut builder = DagBuilder::new();

    let root = if path.is_dir() {
        let links = add_children(&mut builder, path, chunk_size)?;
        DagLeafBuilder::directory(name).with_links(links)
    } else {
        let content = fs::read(path).wrap_err_with(|| format!("failed to read {path}"))?;
        builder.chunk_file(name, &content, chunk_size)?
    };

    Ok(builder.build(root)?)
}

fn add_children(builder: &mut DagBuilder, dir: &Utf8Path, chunk_size: usize) -> EyreResult<Vec<String>> {
    let mut entries = dir
        .read_dir_utf8()
        .wrap_err_with(|| format!("failed to list {dir}"))?
        .collect::<Result<Vec<_>, _>>()?;

    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));

    let mut links = Vec::with_capacity(entries.len());

    for entry in entries {
        let path = entry.path();

        let hash = if path.is_dir() {
            let children = add_children(builder, path, chunk_size)?;
            builder.add(DagLeafBuilder::directory(entry.file_name()).with_links(children))?
        } else {
            let content = fs::read(path).wrap_err_with(|| format!("failed to read {path}"))?;
            builder.add_file(entry.file_name(), &content, chunk_size)?
        };

        links.push(hash);
    }

    Ok(links)
}

/// Recreates the tree rooted at `dag.root` under `dest`.
///
/// Every file leaf must carry its content.
pub fn write_dag(dag: &Dag, dest: &Utf8Path) -> EyreResult<()> {
    let root = dag.root_leaf().ok_or_eyre("dag has no root leaf")?;

    write_leaf(dag, root, dest)
}

fn write_leaf(dag: &Dag, leaf: &DagLeaf, dir: &Utf8Path) -> EyreResult<()> {
    let name = leaf.item_name.rsplit('/').next().unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        bail!("refusing to write leaf named `{}`", leaf.item_name);
    }

    let path = dir.join(name);

    match leaf.leaf_type {
        LeafType::Directory => {
            fs::create_dir_all(&path).wrap_err_with(|| format!("failed to create {path}"))?;

            for link in &leaf.links {
                write_leaf(dag, child(dag, link)?, &path)?;
            }
        }
        LeafType::File => {
            let content = file_content(dag, leaf)?;
            fs::write(&path, content).wrap_err_with(|| format!("failed to write {path}"))?;
        }
    }

    Ok(())
}

fn file_content(dag: &Dag, leaf: &DagLeaf) -> EyreResult<Vec<u8>> {
    if leaf.links.is_empty() {
        return match (&leaf.content, leaf.content_hash) {
            (Some(content), _) => Ok(content.clone()),
            (None, None) => Ok(Vec::new()),
            (None, Some(_)) => bail!("leaf `{}` was transferred without content", leaf.hash),
        };
    }

    let mut content = Vec::new();

    for link in &leaf.links {
        content.extend(file_content(dag, child(dag, link)?)?);
    }

    Ok(content)
}

fn child<'a>(dag: &'a Dag, hash: &str) -> EyreResult<&'a DagLeaf> {
    dag.leaves
        .get(hash)
        .ok_or_else(|| eyre!("leaf `{hash}` is missing from the dag"))
}
