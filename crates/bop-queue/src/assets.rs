//! Cover asset loader.
//!
//! Turns a queue item's cover image into a block of ASCII text sized from the
//! terminal width. Runs on worker tasks; results travel back to the reactor
//! as `Message::AssetLoaded`, one per item, including failures (empty asset).

use bop_proto::gateway::{GatewayClient, GatewayError};
use bop_proto::protocol::QueueItem;
use futures_util::StreamExt;
use image::{imageops::FilterType, DynamicImage};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::message::Message;

/// Dark to bright.
const ASCII_RAMP: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Narrowest cover we bother rendering.
pub const MIN_COVER_COLUMNS: u32 = 8;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no cover for {0}")]
    Unavailable(String),
    #[error("cover download failed: {0}")]
    Fetch(#[from] GatewayError),
    #[error("cover decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("cover worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy)]
pub struct AssetSettings {
    pub width_divisor: u16,
    pub concurrency: usize,
}

/// Everything one batch needs. Tagged with the reactor generation that
/// requested it.
#[derive(Debug, Clone)]
pub struct AssetBatch {
    pub generation: u64,
    pub items: Vec<QueueItem>,
    pub width_hint: u16,
}

/// Cover width in cells for a terminal `width_hint` wide.
pub fn cover_columns(width_hint: u16, width_divisor: u16) -> u32 {
    ((width_hint / width_divisor.max(1)) as u32).max(MIN_COVER_COLUMNS)
}

/// Map luminance onto [`ASCII_RAMP`], `columns` wide and half as many rows
/// (terminal cells are about twice as tall as they are wide).
pub fn render_ascii(image: &DynamicImage, columns: u32) -> String {
    let columns = columns.max(MIN_COVER_COLUMNS);
    let rows = (columns / 2).max(1);
    let luma = image.resize_exact(columns, rows, FilterType::Triangle).to_luma8();

    let mut out = String::with_capacity(((columns + 1) * rows) as usize);
    for y in 0..rows {
        if y > 0 {
            out.push('\n');
        }
        for x in 0..columns {
            let pixel = luma.get_pixel(x, y)[0];
            let idx = ((pixel as f32 / 255.0) * (ASCII_RAMP.len() - 1) as f32).round() as usize;
            out.push(ASCII_RAMP[idx.min(ASCII_RAMP.len() - 1)]);
        }
    }
    out
}

/// Produce the cover asset for one item.
pub async fn load(
    client: &GatewayClient,
    item: &QueueItem,
    width_hint: u16,
    settings: AssetSettings,
) -> Result<String, AssetError> {
    // Server already rendered one.
    if !item.cover.is_empty() {
        return Ok(item.cover.clone());
    }

    let url = item
        .cover_source()
        .ok_or_else(|| AssetError::Unavailable(item.id.clone()))?;
    let bytes = client.fetch_bytes(url).await?;
    let columns = cover_columns(width_hint, settings.width_divisor);

    tokio::task::spawn_blocking(move || -> Result<String, AssetError> {
        let image = image::load_from_memory(&bytes)?;
        Ok(render_ascii(&image, columns))
    })
    .await
    .map_err(|e| AssetError::Worker(e.to_string()))?
}

/// Load every cover in `batch` and post one completion per item into `tx`.
/// Failures are logged and delivered as an empty asset.
pub async fn load_batch(
    client: GatewayClient,
    batch: AssetBatch,
    settings: AssetSettings,
    tx: mpsc::Sender<Message>,
) {
    let AssetBatch {
        generation,
        items,
        width_hint,
    } = batch;
    debug!("[assets] gen={} loading {} covers", generation, items.len());

    let client = &client;
    let tx = &tx;
    futures_util::stream::iter(items)
        .for_each_concurrent(settings.concurrency.max(1), |item| async move {
            let asset = match load(client, &item, width_hint, settings).await {
                Ok(asset) => asset,
                Err(e) => {
                    warn!("[assets] id={} {}", item.id, e);
                    String::new()
                }
            };
            let msg = Message::AssetLoaded {
                generation,
                id: item.id,
                asset,
            };
            if tx.send(msg).await.is_err() {
                debug!("[assets] inbox closed, dropping completion");
            }
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::time::Duration;

    fn gradient(w: u32, h: u32) -> DynamicImage {
        let img = GrayImage::from_fn(w, h, |x, _| Luma([((x * 255) / (w - 1)) as u8]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_render_dimensions() {
        let art = render_ascii(&gradient(64, 64), 20);
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.chars().count() == 20));
        assert!(!art.ends_with('\n'));
    }

    #[test]
    fn test_render_maps_luminance() {
        let art = render_ascii(&gradient(128, 16), 16);
        let first = art.lines().next().unwrap();
        assert_eq!(first.chars().next(), Some(' '));
        assert_eq!(first.chars().last(), Some('@'));
    }

    #[test]
    fn test_render_minimum_width() {
        let art = render_ascii(&gradient(8, 8), 2);
        assert_eq!(art.lines().next().unwrap().chars().count(), MIN_COVER_COLUMNS as usize);
        assert_eq!(art.lines().count(), (MIN_COVER_COLUMNS / 2) as usize);
    }

    #[test]
    fn test_cover_columns() {
        assert_eq!(cover_columns(90, 3), 30);
        assert_eq!(cover_columns(90, 0), 90);
        assert_eq!(cover_columns(12, 3), MIN_COVER_COLUMNS);
    }

    fn settings() -> AssetSettings {
        AssetSettings {
            width_divisor: 3,
            concurrency: 4,
        }
    }

    fn client() -> GatewayClient {
        GatewayClient::new("http://127.0.0.1:9", Duration::from_millis(300)).unwrap()
    }

    #[tokio::test]
    async fn test_server_rendered_cover_is_reused() {
        let item = QueueItem {
            id: "a".into(),
            cover: "##\n##".into(),
            ..Default::default()
        };
        let asset = load(&client(), &item, 90, settings()).await.unwrap();
        assert_eq!(asset, "##\n##");
    }

    #[tokio::test]
    async fn test_missing_cover_url_is_unavailable() {
        let item = QueueItem {
            id: "nope".into(),
            ..Default::default()
        };
        let err = load(&client(), &item, 90, settings()).await.unwrap_err();
        assert!(matches!(err, AssetError::Unavailable(ref id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_batch_delivers_once_per_item_even_on_failure() {
        let items = vec![
            QueueItem {
                id: "ok".into(),
                cover: "@@".into(),
                ..Default::default()
            },
            QueueItem {
                id: "no-url".into(),
                ..Default::default()
            },
            QueueItem {
                id: "dead-host".into(),
                url: "http://127.0.0.1:9/cover.png".into(),
                ..Default::default()
            },
        ];
        let (tx, mut rx) = mpsc::channel(16);
        load_batch(
            client(),
            AssetBatch {
                generation: 7,
                items,
                width_hint: 90,
            },
            settings(),
            tx,
        )
        .await;

        let mut seen = Vec::new();
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::AssetLoaded {
                    generation,
                    id,
                    asset,
                } => {
                    assert_eq!(generation, 7);
                    seen.push((id, asset));
                }
                _ => panic!("unexpected message"),
            }
        }
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("dead-host".to_string(), String::new()),
                ("no-url".to_string(), String::new()),
                ("ok".to_string(), "@@".to_string()),
            ]
        );
    }
}
