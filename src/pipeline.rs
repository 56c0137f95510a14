//! Sequential batch runner.
//!
//! Rows are processed strictly in table order; each row is decoded into a
//! [`LayerStack`], rendered onto its own canvas, and written out before the
//! next row begins. A failing row is reported and skipped, it does not abort
//! the batch.

use crate::config::{ColumnConfig, Config};
use crate::data::{JobRow, RowSource};
use crate::error::{Error, Result};
use crate::image::ImgBackend;
use crate::layer::{AssetLayer, Layer, LayerStack, RenderContext, TextLayer};
use crate::logs::Reporter;
use crate::text::FontMap;

use std::fs;
use std::path::{Path, PathBuf};

/// Aggregated outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output paths of successfully rendered rows, in table order.
    pub completed: Vec<PathBuf>,
    /// Rows that failed, with their 0-based table index.
    pub failed: Vec<(usize, Error)>,
    /// Rows skipped for lacking the source or output field.
    pub skipped: usize,
}

pub struct Pipeline<S: RowSource> {
    source: S,
    config: Config,
    base_dir: PathBuf,
    backend: ImgBackend,
    fonts: FontMap,
}

impl<S: RowSource> Pipeline<S> {
    /// Wires up the raster backend; the font stays unresolved until a text
    /// field actually needs it.
    pub fn new(base_dir: impl Into<PathBuf>, config: Config, source: S) -> Result<Self> {
        let backend = ImgBackend::new()?;
        let fonts = FontMap::new(config.font.clone());
        Ok(Self {
            source,
            config,
            base_dir: base_dir.into(),
            backend,
            fonts,
        })
    }

    pub fn run(mut self, reporter: &Reporter) -> Result<BatchReport> {
        let output_dir = self.base_dir.join(&self.config.output_dir);
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir)?;
        }

        let table = self.source.read()?;
        for required in [&self.config.columns.source, &self.config.columns.output] {
            if !table.has_column(required) {
                return Err(Error::MissingColumn(required.clone()));
            }
        }

        let total = table.rows().len();
        let ctx = RenderContext {
            backend: &self.backend,
            fonts: &self.fonts,
            reporter,
        };

        let mut report = BatchReport::default();
        for row in table.rows() {
            let Some((stack, out_path)) =
                decode_row(&self.base_dir, &output_dir, &self.config.columns, table.columns(), row)
            else {
                report.skipped += 1;
                continue;
            };
            match render_row(stack, &out_path, &ctx) {
                Ok(()) => {
                    reporter.info(format!(
                        "{}/{} [{}] generated",
                        row.index() + 1,
                        total,
                        out_path.display()
                    ));
                    report.completed.push(out_path);
                }
                Err(e) => {
                    reporter.warn(format!("row {}: {e}", row.index() + 1));
                    report.failed.push((row.index(), e));
                }
            }
        }

        reporter.info("batch complete");
        Ok(report)
    }
}

fn render_row(stack: LayerStack, out_path: &Path, ctx: &RenderContext) -> Result<()> {
    let img = stack.render(ctx)?;
    ctx.backend.write(&img, out_path)
}

/// Turns one job row into its layer stack and output path, or `None` when
/// the row must be skipped entirely (no canvas, no output, no log line).
fn decode_row(
    base_dir: &Path,
    output_dir: &Path,
    columns: &ColumnConfig,
    table_columns: &[String],
    row: &JobRow,
) -> Option<(LayerStack, PathBuf)> {
    row.get(&columns.source)?;
    let out_name = row.get(&columns.output)?;

    let source_dir = columns.source_directory();
    let mut layers: Vec<Box<dyn Layer>> = Vec::new();
    for column in table_columns.iter().filter(|c| *c != &columns.output) {
        let Some(value) = row.get(column) else {
            continue;
        };
        if *column == columns.text {
            layers.push(Box::new(TextLayer {
                text: value.to_string(),
            }));
            continue;
        }
        let dir = columns.directory(column);
        layers.push(Box::new(AssetLayer {
            path: base_dir.join(dir).join(value),
            resize: dir == source_dir,
        }));
    }

    Some((LayerStack(layers), output_dir.join(out_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> JobRow {
        JobRow::new(
            0,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn decode(
        table_columns: &[String],
        row: &JobRow,
    ) -> Option<(LayerStack, PathBuf)> {
        decode_row(
            Path::new("/work"),
            Path::new("/work/output"),
            &ColumnConfig::default(),
            table_columns,
            row,
        )
    }

    #[test]
    fn row_without_output_is_skipped() {
        let cols = columns(&["source", "output"]);
        let r = row(&[("source", "a.png")]);
        assert!(decode(&cols, &r).is_none());
    }

    #[test]
    fn row_without_source_is_skipped() {
        let cols = columns(&["source", "output"]);
        let r = row(&[("output", "out.jpg")]);
        assert!(decode(&cols, &r).is_none());
    }

    #[test]
    fn layers_follow_table_order_and_skip_blanks() {
        let cols = columns(&["source", "badge_left", "badge_right", "text", "output"]);
        let r = row(&[
            ("source", "a.png"),
            ("badge_right", "sale.png"),
            ("text", "NEW"),
            ("output", "out.jpg"),
        ]);
        let (LayerStack(layers), out_path) = decode(&cols, &r).unwrap();
        assert_eq!(out_path, Path::new("/work/output/out.jpg"));
        assert_eq!(layers.len(), 3);

        let dump = format!("{layers:?}");
        let source_at = dump.find("/work/source/a.png").unwrap();
        let badge_at = dump.find("/work/badge/sale.png").unwrap();
        let text_at = dump.find("NEW").unwrap();
        assert!(source_at < badge_at && badge_at < text_at);
    }

    #[test]
    fn only_source_assets_are_resized() {
        let cols = columns(&["source", "badge_left", "output"]);
        let r = row(&[
            ("source", "a.jpg"),
            ("badge_left", "b.png"),
            ("output", "out.jpg"),
        ]);
        let (LayerStack(layers), _) = decode(&cols, &r).unwrap();
        let dump = format!("{layers:?}");
        let source_part = &dump[..dump.find("badge").unwrap()];
        assert!(source_part.contains("resize: true"));
        let badge_part = &dump[dump.find("badge").unwrap()..];
        assert!(badge_part.contains("resize: false"));
    }

    #[test]
    fn shared_directory_columns_resolve_to_one_folder() {
        let cols = columns(&["source", "badge_left", "badge_right", "output"]);
        let r = row(&[
            ("source", "a.jpg"),
            ("badge_left", "l.png"),
            ("badge_right", "r.png"),
            ("output", "out.png"),
        ]);
        let (LayerStack(layers), _) = decode(&cols, &r).unwrap();
        let dump = format!("{layers:?}");
        assert!(dump.contains("/work/badge/l.png"));
        assert!(dump.contains("/work/badge/r.png"));
    }

    #[test]
    fn empty_values_map_never_panics() {
        let cols = columns(&["source", "output"]);
        let r = JobRow::new(0, HashMap::new());
        assert!(decode(&cols, &r).is_none());
    }
}
