use serde::{
    de::Error as DeError, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};
use stack_string::StackString;

/// Content stored under a block's type key. Only `children` is interpreted,
/// everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockBody {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

macro_rules! block_kinds {
    ($($variant:ident => $name:literal),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum BlockKind {
            $($variant(BlockBody),)*
            Unsupported(StackString, BlockBody),
        }

        impl BlockKind {
            #[must_use]
            pub fn from_parts(type_name: &str, body: BlockBody) -> Self {
                match type_name {
                    $($name => Self::$variant(body),)*
                    other => Self::Unsupported(other.into(), body),
                }
            }

            #[must_use]
            pub fn type_name(&self) -> &str {
                match self {
                    $(Self::$variant(_) => $name,)*
                    Self::Unsupported(name, _) => name.as_str(),
                }
            }

            #[must_use]
            pub fn body(&self) -> &BlockBody {
                match self {
                    $(Self::$variant(body))|* | Self::Unsupported(_, body) => body,
                }
            }

            pub fn body_mut(&mut self) -> &mut BlockBody {
                match self {
                    $(Self::$variant(body))|* | Self::Unsupported(_, body) => body,
                }
            }
        }
    };
}

block_kinds! {
    Paragraph => "paragraph",
    Heading1 => "heading_1",
    Heading2 => "heading_2",
    Heading3 => "heading_3",
    BulletedListItem => "bulleted_list_item",
    NumberedListItem => "numbered_list_item",
    ToDo => "to_do",
    Toggle => "toggle",
    Quote => "quote",
    Callout => "callout",
    Code => "code",
    Divider => "divider",
    Image => "image",
    Bookmark => "bookmark",
    Equation => "equation",
    TableOfContents => "table_of_contents",
    Table => "table",
    TableRow => "table_row",
    ColumnList => "column_list",
    Column => "column",
    ChildPage => "child_page",
    ChildDatabase => "child_database",
    SyncedBlock => "synced_block",
    LinkToPage => "link_to_page",
    Template => "template",
}

/// A block as listed by the API, and as sent back when creating a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: Option<StackString>,
    pub has_children: bool,
    pub kind: BlockKind,
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    id: Option<StackString>,
    #[serde(rename = "type")]
    block_type: StackString,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let RawBlock {
            id,
            block_type,
            has_children,
            mut rest,
        } = RawBlock::deserialize(deserializer)?;
        let body = match rest.remove(block_type.as_str()) {
            Some(Value::Null) | None => BlockBody::default(),
            Some(value) => serde_json::from_value(value).map_err(D::Error::custom)?,
        };
        Ok(Self {
            id,
            has_children,
            kind: BlockKind::from_parts(&block_type, body),
        })
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let type_name = self.kind.type_name();
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("object", "block")?;
        map.serialize_entry("type", type_name)?;
        map.serialize_entry(type_name, self.kind.body())?;
        map.end()
    }
}

impl Block {
    #[must_use]
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: None,
            has_children: false,
            kind,
        }
    }

    /// Synced blocks mirror content owned elsewhere and are copied as-is.
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        self.has_children && !matches!(self.kind, BlockKind::SyncedBlock(_))
    }

    #[must_use]
    pub fn children(&self) -> &[Block] {
        &self.kind.body().children
    }

    pub fn set_children(&mut self, children: Vec<Block>) {
        self.kind.body_mut().children = children;
    }
}
