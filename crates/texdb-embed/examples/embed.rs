use texdb_core::config::Config;
use texdb_embed::get_default_embedder;

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let embedder = get_default_embedder(&config.embedding()?, config.base_dir())?;
    let texts = vec!["hello world".to_string(), "градиентный бустинг".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    Ok(())
}
