//! Deployment preflight: directories writable, engine binaries present.

use std::path::Path;

use overcut_media::{check_ffmpeg, check_ffprobe};
use overcut_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env();
    println!(
        "overcut-selfcheck: starting with output_dir={}",
        config.output_dir.display()
    );

    ensure_dir(&config.upload_dir).await?;
    ensure_dir(&config.output_dir).await?;
    ensure_dir(&config.assets_dir).await?;

    let ffmpeg = check_ffmpeg()?;
    let ffprobe = check_ffprobe()?;
    println!(
        "overcut-selfcheck: found ffmpeg at {}, ffprobe at {}",
        ffmpeg.display(),
        ffprobe.display()
    );

    println!("overcut-selfcheck: ok");
    Ok(())
}

async fn ensure_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
