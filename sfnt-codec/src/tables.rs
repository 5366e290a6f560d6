//! The tables this crate knows how to read and build
//!
//! Every table is reached through the [`AnyTable`] and [`AnyTableBuilder`]
//! enums, whose variants are chosen by tag when a font is loaded. Tags
//! without a dedicated implementation use the [`opaque`] variant, which
//! round-trips its bytes unchanged.

/// Implement [`FontTable`] for a struct with `record` and `data` fields.
///
/// [`FontTable`]: crate::FontTable
macro_rules! font_table {
    ($table:ident) => {
        impl $crate::table::FontTable for $table {
            fn record(&self) -> &$crate::TableRecord {
                &self.record
            }

            fn data(&self) -> &$crate::FontData {
                &self.data
            }
        }
    };
}

/// Fields at fixed offsets: a getter on the table, and a getter and an
/// in-place setter on the builder.
///
/// Getters on short data return the type's default. Setters go through the
/// builder's writable bytes, so the first one copies.
macro_rules! record_fields {
    (
        $table:ident, $builder:ident {
            $(
                $(#[$attr:meta])*
                $name:ident, $setter:ident: $ty:ty = $offset:expr;
            )*
        }
    ) => {
        impl $table {
            $(
                $(#[$attr])*
                pub fn $name(&self) -> $ty {
                    self.data.read_at($offset).unwrap_or_default()
                }
            )*
        }

        impl $builder {
            $(
                $(#[$attr])*
                pub fn $name(&self) -> $ty {
                    self.core.read_or_default($offset)
                }

                pub fn $setter(&mut self, value: $ty) -> Result<(), $crate::ReadError> {
                    self.core.writable_data().write_at($offset, value).map(|_| ())
                }
            )*
        }
    };
}

/// A builder without an object model, which always builds from its bytes.
macro_rules! data_builder {
    ($builder:ident => $table:ident) => {
        impl $builder {
            pub(crate) fn from_core(core: $crate::table::BuilderCore) -> Self {
                $builder { core }
            }
        }

        impl $crate::table::TableBuilder for $builder {
            type Table = $table;

            fn core(&self) -> &$crate::table::BuilderCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut $crate::table::BuilderCore {
                &mut self.core
            }

            fn ready_to_serialize(&self) -> bool {
                false
            }

            fn size_to_serialize(&self) -> $crate::table::SerializedSize {
                $crate::table::SerializedSize::Known(0)
            }

            fn serialize(&self, _into: &$crate::WritableFontData) -> Result<usize, $crate::Error> {
                Ok(0)
            }

            fn reset_model(&mut self) {}

            fn materialize(
                &self,
                record: $crate::TableRecord,
                data: $crate::FontData,
            ) -> Result<$table, $crate::Error> {
                Ok($table { record, data })
            }
        }
    };
}

pub mod eblc;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod opaque;

use types::Tag;

use crate::{
    error::Error,
    table::{BuilderCore, BuilderData, FontTable, TableBuilder},
    FontData, TableRecord,
};

use self::{
    eblc::{Eblc, EblcBuilder},
    glyf::{Glyf, GlyfBuilder},
    head::{Head, HeadBuilder},
    hhea::{Hhea, HheaBuilder},
    hmtx::{Hmtx, HmtxBuilder},
    loca::{Loca, LocaBuilder},
    maxp::{Maxp, MaxpBuilder},
    opaque::{OpaqueBuilder, OpaqueTable},
};

/// A table with a dedicated variant in [`AnyTable`].
pub trait TopLevelTable: FontTable + Sized {
    /// The tag this table is registered under.
    const TAG: Tag;

    fn from_any(table: &AnyTable) -> Option<&Self>;
}

/// A builder with a dedicated variant in [`AnyTableBuilder`].
pub trait TopLevelBuilder: TableBuilder {
    /// The tag this builder is registered under.
    const TAG: Tag;

    fn from_any(builder: &AnyTableBuilder) -> Option<&Self>;

    fn from_any_mut(builder: &mut AnyTableBuilder) -> Option<&mut Self>;
}

macro_rules! table_registry {
    ($( $variant:ident($table:ident, $builder:ident) = $tag:path, )*) => {
        /// Any built table.
        #[derive(Debug, Clone)]
        pub enum AnyTable {
            $( $variant($table), )*
            Opaque(OpaqueTable),
        }

        /// Any table builder.
        #[derive(Debug, Clone)]
        pub enum AnyTableBuilder {
            $( $variant($builder), )*
            Opaque(OpaqueBuilder),
        }

        impl AnyTableBuilder {
            /// Create the builder registered for this record's tag.
            ///
            /// Tags without a dedicated implementation get an opaque builder.
            pub fn new(record: TableRecord, data: Option<BuilderData>) -> Self {
                let core = BuilderCore::new(record, data);
                match record.tag() {
                    $( tag if tag == $tag => AnyTableBuilder::$variant($builder::from_core(core)), )*
                    _ => AnyTableBuilder::Opaque(OpaqueBuilder::from_core(core)),
                }
            }

            pub fn core(&self) -> &BuilderCore {
                match self {
                    $( AnyTableBuilder::$variant(builder) => builder.core(), )*
                    AnyTableBuilder::Opaque(builder) => builder.core(),
                }
            }

            pub fn core_mut(&mut self) -> &mut BuilderCore {
                match self {
                    $( AnyTableBuilder::$variant(builder) => builder.core_mut(), )*
                    AnyTableBuilder::Opaque(builder) => builder.core_mut(),
                }
            }

            pub fn ready_to_build(&self) -> bool {
                match self {
                    $( AnyTableBuilder::$variant(builder) => builder.ready_to_build(), )*
                    AnyTableBuilder::Opaque(builder) => builder.ready_to_build(),
                }
            }

            /// Replace the builder's bytes, discarding any model.
            pub fn set_data(&mut self, data: FontData) {
                match self {
                    $( AnyTableBuilder::$variant(builder) => builder.set_data(data), )*
                    AnyTableBuilder::Opaque(builder) => builder.set_data(data),
                }
            }

            /// Consume the builder, producing a table.
            pub fn build(self) -> Result<AnyTable, Error> {
                match self {
                    $( AnyTableBuilder::$variant(builder) => builder.build().map(AnyTable::$variant), )*
                    AnyTableBuilder::Opaque(builder) => builder.build().map(AnyTable::Opaque),
                }
            }
        }

        impl FontTable for AnyTable {
            fn record(&self) -> &TableRecord {
                match self {
                    $( AnyTable::$variant(table) => table.record(), )*
                    AnyTable::Opaque(table) => table.record(),
                }
            }

            fn data(&self) -> &FontData {
                match self {
                    $( AnyTable::$variant(table) => table.data(), )*
                    AnyTable::Opaque(table) => table.data(),
                }
            }

            fn checksum(&self) -> u32 {
                match self {
                    $( AnyTable::$variant(table) => table.checksum(), )*
                    AnyTable::Opaque(table) => table.checksum(),
                }
            }
        }

        $(
            impl TopLevelTable for $table {
                const TAG: Tag = $tag;

                fn from_any(table: &AnyTable) -> Option<&Self> {
                    match table {
                        AnyTable::$variant(table) => Some(table),
                        _ => None,
                    }
                }
            }

            impl TopLevelBuilder for $builder {
                const TAG: Tag = $tag;

                fn from_any(builder: &AnyTableBuilder) -> Option<&Self> {
                    match builder {
                        AnyTableBuilder::$variant(builder) => Some(builder),
                        _ => None,
                    }
                }

                fn from_any_mut(builder: &mut AnyTableBuilder) -> Option<&mut Self> {
                    match builder {
                        AnyTableBuilder::$variant(builder) => Some(builder),
                        _ => None,
                    }
                }
            }
        )*
    };
}

table_registry! {
    Head(Head, HeadBuilder) = head::TAG,
    Hhea(Hhea, HheaBuilder) = hhea::TAG,
    Maxp(Maxp, MaxpBuilder) = maxp::TAG,
    Hmtx(Hmtx, HmtxBuilder) = hmtx::TAG,
    Loca(Loca, LocaBuilder) = loca::TAG,
    Glyf(Glyf, GlyfBuilder) = glyf::TAG,
    Eblc(Eblc, EblcBuilder) = eblc::TAG,
}

impl AnyTableBuilder {
    pub fn tag(&self) -> Tag {
        self.core().tag()
    }
}
