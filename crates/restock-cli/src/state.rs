//! `restock state`: inspect or reset the dedup state file.

use anyhow::Context;

use restock_store::StateFile;

pub(crate) fn show(store: &StateFile) -> anyhow::Result<()> {
    let snapshot = store
        .load()
        .with_context(|| format!("failed to read state file {}", store.path().display()))?;

    if snapshot.first_run {
        println!(
            "{}: no state yet; the next check announces every available product",
            store.path().display()
        );
        return Ok(());
    }

    println!(
        "{}: {} product(s) recorded as unavailable",
        store.path().display(),
        snapshot.set.len()
    );
    for url in snapshot.set.iter() {
        println!("  {url}");
    }
    Ok(())
}

pub(crate) fn clear(store: &StateFile) -> anyhow::Result<()> {
    let removed = store
        .clear()
        .with_context(|| format!("failed to remove state file {}", store.path().display()))?;
    if removed {
        tracing::info!(path = %store.path().display(), "state file removed");
        println!("removed {}", store.path().display());
    } else {
        println!("{}: nothing to clear", store.path().display());
    }
    Ok(())
}
