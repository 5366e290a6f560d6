//! The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table
//!
//! The table cannot describe itself: how many of its records are long
//! metrics comes from `hhea`, and how many glyphs it covers comes from
//! `maxp`. The font builder pushes both values into the builder before
//! anything is built.

use types::Tag;

use crate::{
    error::Error,
    table::{BuilderCore, SerializedSize, TableBuilder},
    FontData, TableRecord, WritableFontData,
};

/// 'hmtx'
pub const TAG: Tag = Tag::new(b"hmtx");

/// The length of one long metric record.
pub const LONG_METRIC_LEN: usize = 4;

/// An advance width and left side bearing pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LongMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

impl LongMetric {
    pub fn new(advance: u16, side_bearing: i16) -> Self {
        LongMetric {
            advance,
            side_bearing,
        }
    }
}

/// The contents of an hmtx table.
///
/// Glyphs past the end of `long_metrics` share the advance of the last long
/// metric and have their side bearing in `left_side_bearings`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HorizontalMetrics {
    pub long_metrics: Vec<LongMetric>,
    pub left_side_bearings: Vec<i16>,
}

impl HorizontalMetrics {
    fn byte_len(&self) -> usize {
        self.long_metrics.len() * LONG_METRIC_LEN + self.left_side_bearings.len() * 2
    }
}

/// The [hmtx](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table.
#[derive(Debug, Clone)]
pub struct Hmtx {
    record: TableRecord,
    data: FontData,
    number_of_h_metrics: Option<u16>,
    num_glyphs: Option<u16>,
}

impl Hmtx {
    /// The number of long metrics, if it was known when the table was built.
    pub fn number_of_h_metrics(&self) -> Option<u16> {
        self.number_of_h_metrics
    }

    /// The number of glyphs, if it was known when the table was built.
    pub fn num_glyphs(&self) -> Option<u16> {
        self.num_glyphs
    }

    // without hhea, treat every record as a long metric
    fn long_metric_count(&self) -> usize {
        self.number_of_h_metrics
            .map(usize::from)
            .unwrap_or(self.data.len() / LONG_METRIC_LEN)
    }

    fn covers(&self, gid: u16) -> bool {
        self.num_glyphs.is_none_or(|count| gid < count)
    }

    /// The long metric record at `index`.
    pub fn long_metric(&self, index: usize) -> Option<LongMetric> {
        if index >= self.long_metric_count() {
            return None;
        }
        let offset = index * LONG_METRIC_LEN;
        let advance = self.data.read_at(offset).ok()?;
        let side_bearing = self.data.read_at(offset + 2).ok()?;
        Some(LongMetric::new(advance, side_bearing))
    }

    /// The advance width of a glyph.
    pub fn advance_width(&self, gid: u16) -> Option<u16> {
        if !self.covers(gid) {
            return None;
        }
        let last = self.long_metric_count().checked_sub(1)?;
        let index = usize::from(gid).min(last);
        self.data.read_at(index * LONG_METRIC_LEN).ok()
    }

    /// The left side bearing of a glyph.
    pub fn left_side_bearing(&self, gid: u16) -> Option<i16> {
        if !self.covers(gid) {
            return None;
        }
        let long_count = self.long_metric_count();
        let gid = usize::from(gid);
        let offset = if gid < long_count {
            gid * LONG_METRIC_LEN + 2
        } else {
            long_count * LONG_METRIC_LEN + (gid - long_count) * 2
        };
        self.data.read_at(offset).ok()
    }
}

font_table!(Hmtx);

/// A builder for the hmtx table.
///
/// The metrics are parsed into a [`HorizontalMetrics`] model on first
/// mutable access, which needs both values pushed in by the font builder.
#[derive(Debug, Clone)]
pub struct HmtxBuilder {
    core: BuilderCore,
    num_glyphs: Option<u16>,
    number_of_h_metrics: Option<u16>,
    metrics: Option<HorizontalMetrics>,
}

impl HmtxBuilder {
    pub(crate) fn from_core(core: BuilderCore) -> Self {
        HmtxBuilder {
            core,
            num_glyphs: None,
            number_of_h_metrics: None,
            metrics: None,
        }
    }

    /// Set the glyph count, from `maxp`.
    pub fn set_num_glyphs(&mut self, num_glyphs: u16) {
        self.num_glyphs = Some(num_glyphs);
    }

    /// Set the number of long metrics, from `hhea`.
    pub fn set_number_of_h_metrics(&mut self, number_of_h_metrics: u16) {
        self.number_of_h_metrics = Some(number_of_h_metrics);
    }

    /// The number of long metrics.
    ///
    /// Once the model is loaded this is the length of its long metric list.
    pub fn number_of_h_metrics(&self) -> Result<u16, Error> {
        match &self.metrics {
            Some(metrics) => Ok(count(metrics.long_metrics.len())),
            None => self.number_of_h_metrics.ok_or_else(|| self.missing("numberOfHMetrics")),
        }
    }

    /// The number of glyphs that only have a left side bearing.
    pub fn number_of_lsbs(&self) -> Result<u16, Error> {
        match &self.metrics {
            Some(metrics) => Ok(count(metrics.left_side_bearings.len())),
            None => {
                let num_glyphs = self.num_glyphs.ok_or_else(|| self.missing("numGlyphs"))?;
                Ok(num_glyphs.saturating_sub(self.number_of_h_metrics()?))
            }
        }
    }

    /// The metrics model, parsing it from the raw bytes if needed.
    ///
    /// Marks the model as changed.
    pub fn metrics_mut(&mut self) -> Result<&mut HorizontalMetrics, Error> {
        let metrics = match self.metrics.take() {
            Some(metrics) => metrics,
            None => self.parse_metrics()?,
        };
        self.core.set_model_changed();
        Ok(self.metrics.insert(metrics))
    }

    /// Replace the metrics model.
    pub fn set_metrics(&mut self, metrics: HorizontalMetrics) {
        self.metrics = Some(metrics);
        self.core.set_model_changed();
    }

    fn missing(&self, field: &'static str) -> Error {
        Error::MissingState {
            tag: self.core.tag(),
            field,
        }
    }

    fn parse_metrics(&self) -> Result<HorizontalMetrics, Error> {
        let number_of_h_metrics = self
            .number_of_h_metrics
            .ok_or_else(|| self.missing("numberOfHMetrics"))?;
        let num_glyphs = self.num_glyphs.ok_or_else(|| self.missing("numGlyphs"))?;
        let Some(data) = self.core.font_data() else {
            return Ok(HorizontalMetrics::default());
        };
        let long_count = usize::from(number_of_h_metrics);
        let lsb_count = usize::from(num_glyphs.saturating_sub(number_of_h_metrics));
        let long_metrics = (0..long_count)
            .map(|i| {
                let offset = i * LONG_METRIC_LEN;
                Ok(LongMetric::new(
                    data.read_at(offset)?,
                    data.read_at(offset + 2)?,
                ))
            })
            .collect::<Result<Vec<_>, crate::ReadError>>()?;
        let left_side_bearings = data.read_array(long_count * LONG_METRIC_LEN, lsb_count)?;
        Ok(HorizontalMetrics {
            long_metrics,
            left_side_bearings,
        })
    }
}

// counts are bounded by the u16 glyph count in well-formed fonts
fn count(len: usize) -> u16 {
    len.min(u16::MAX as usize) as u16
}

impl TableBuilder for HmtxBuilder {
    type Table = Hmtx;

    fn core(&self) -> &BuilderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BuilderCore {
        &mut self.core
    }

    fn ready_to_serialize(&self) -> bool {
        // trailing side bearings need a long metric to take their advance from
        self.metrics.as_ref().is_some_and(|metrics| {
            !metrics.long_metrics.is_empty() || metrics.left_side_bearings.is_empty()
        })
    }

    fn size_to_serialize(&self) -> SerializedSize {
        SerializedSize::Known(self.metrics.as_ref().map_or(0, HorizontalMetrics::byte_len))
    }

    fn serialize(&self, into: &WritableFontData) -> Result<usize, Error> {
        let Some(metrics) = &self.metrics else {
            return Ok(0);
        };
        let mut pos = 0;
        for metric in &metrics.long_metrics {
            pos += into.write_at(pos, metric.advance)?;
            pos += into.write_at(pos, metric.side_bearing)?;
        }
        for lsb in &metrics.left_side_bearings {
            pos += into.write_at(pos, *lsb)?;
        }
        Ok(pos)
    }

    fn reset_model(&mut self) {
        self.metrics = None;
    }

    fn materialize(&self, record: TableRecord, data: FontData) -> Result<Hmtx, Error> {
        let (number_of_h_metrics, num_glyphs) = match &self.metrics {
            Some(metrics) => (
                Some(count(metrics.long_metrics.len())),
                Some(count(
                    metrics.long_metrics.len() + metrics.left_side_bearings.len(),
                )),
            ),
            None => (self.number_of_h_metrics, self.num_glyphs),
        };
        Ok(Hmtx {
            record,
            data,
            number_of_h_metrics,
            num_glyphs,
        })
    }
}

#[cfg(test)]
mod tests {
    use sfnt_test_data::BeBuffer;

    use super::*;
    use crate::table::{BuilderData, FontTable};

    // three glyphs, two long metrics
    fn builder() -> HmtxBuilder {
        let buf = BeBuffer::new()
            .extend([500u16])
            .extend([10i16])
            .extend([600u16])
            .extend([-20i16])
            .extend([30i16]);
        let data = FontData::new(buf.to_vec());
        let record = TableRecord::from_directory(TAG, 0, 0, data.len() as u32);
        HmtxBuilder::from_core(BuilderCore::new(record, Some(BuilderData::Reading(data))))
    }

    #[test]
    fn counts_need_wiring() {
        let mut hmtx = builder();
        assert!(matches!(
            hmtx.number_of_h_metrics(),
            Err(Error::MissingState {
                field: "numberOfHMetrics",
                ..
            })
        ));
        assert!(matches!(
            hmtx.metrics_mut(),
            Err(Error::MissingState { .. })
        ));
        hmtx.set_number_of_h_metrics(2);
        hmtx.set_num_glyphs(3);
        assert_eq!(hmtx.number_of_h_metrics().unwrap(), 2);
        assert_eq!(hmtx.number_of_lsbs().unwrap(), 1);
    }

    #[test]
    fn lookups() {
        let mut hmtx = builder();
        hmtx.set_number_of_h_metrics(2);
        hmtx.set_num_glyphs(3);
        let hmtx = hmtx.build().unwrap();
        assert_eq!(hmtx.advance_width(0), Some(500));
        assert_eq!(hmtx.advance_width(2), Some(600));
        assert_eq!(hmtx.left_side_bearing(1), Some(-20));
        assert_eq!(hmtx.left_side_bearing(2), Some(30));
        assert_eq!(hmtx.advance_width(3), None);
        assert_eq!(hmtx.long_metric(1), Some(LongMetric::new(600, -20)));
        assert_eq!(hmtx.long_metric(2), None);
    }

    #[test]
    fn edit_model() {
        let mut hmtx = builder();
        hmtx.set_number_of_h_metrics(2);
        hmtx.set_num_glyphs(3);
        let metrics = hmtx.metrics_mut().unwrap();
        assert_eq!(metrics.left_side_bearings, [30]);
        metrics.long_metrics.push(LongMetric::new(700, 5));
        metrics.left_side_bearings.clear();
        assert_eq!(hmtx.number_of_h_metrics().unwrap(), 3);
        assert_eq!(hmtx.number_of_lsbs().unwrap(), 0);

        let hmtx = hmtx.build().unwrap();
        assert_eq!(hmtx.record().length(), Some(12));
        assert_eq!(hmtx.advance_width(2), Some(700));
        assert_eq!(hmtx.left_side_bearing(2), Some(5));
        assert_eq!(hmtx.num_glyphs(), Some(3));
    }

    #[test]
    fn lsbs_without_long_metrics_are_not_ready() {
        let mut hmtx = builder();
        hmtx.set_metrics(HorizontalMetrics {
            long_metrics: Vec::new(),
            left_side_bearings: vec![1, 2],
        });
        assert!(!hmtx.ready_to_build());
        assert!(matches!(hmtx.build(), Err(Error::NotReady(_))));
    }
}
