//! Tree builder: turns token source events into a positioned xast tree.
//!
//! Nodes live in an arena while the parse runs; the open-node stack holds
//! arena indices only. Ownership moves into parents' children lists once, in
//! [`TreeBuilder::finish`].

use crate::correction::PositionCorrection;
use crate::doctype::parse_doctype;
use crate::error::{Message, RuleId};
use crate::position::{Point, Position};
use crate::tokenizer::{EventSink, SaxEvent};
use crate::types::{
    Attributes, Cdata, Comment, Doctype, Element, Instruction, Node, Root, Text,
};

const ROOT: usize = 0;

#[derive(Clone, Copy, Debug, Default)]
pub struct TreeBuilderConfig {
    /// End-position fixups applied to comments and text.
    pub correction: PositionCorrection,
}

#[derive(Debug)]
enum ArenaKind {
    Root,
    Element {
        name: String,
        attributes: Attributes,
    },
    Text(String),
    Comment(String),
    Cdata(String),
    Doctype {
        name: String,
        public: Option<String>,
        system: Option<String>,
    },
    Instruction {
        name: String,
        value: String,
    },
}

#[derive(Debug)]
struct ArenaNode {
    kind: ArenaKind,
    start: Point,
    end: Point,
    children: Vec<usize>,
}

/// Builds one xast tree from one event stream.
pub struct TreeBuilder {
    config: TreeBuilderConfig,
    arena: Vec<ArenaNode>,
    /// Indices of open nodes; `ROOT` is always at the bottom.
    open: Vec<usize>,
    /// Where the next node starts.
    position: Point,
}

impl TreeBuilder {
    pub fn new(config: TreeBuilderConfig) -> Self {
        Self {
            config,
            arena: vec![ArenaNode {
                kind: ArenaKind::Root,
                start: Point::START,
                end: Point::START,
                children: Vec::new(),
            }],
            open: vec![ROOT],
            position: Point::START,
        }
    }

    /// The builder's cursor: where the next node will start.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Number of open nodes, not counting the root.
    pub fn depth(&self) -> usize {
        self.open.len() - 1
    }

    /// Close the build and return the tree.
    ///
    /// Fails with an internal error when nodes are still open.
    pub fn finish(self) -> Result<Root, Message> {
        if self.open.len() != 1 {
            return Err(Message::internal(
                format!("Expected all nodes to be closed, {} still open", self.depth()),
                self.position,
            ));
        }
        Ok(self.into_tree())
    }

    /// Apply one token source event.
    pub fn process(&mut self, event: SaxEvent, now: Point) -> Result<(), Message> {
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "xml.tree_builder", "event {event:?} now={}:{}", now.line, now.column);

        match event {
            SaxEvent::Doctype(raw) => self.doctype(&raw, now),
            SaxEvent::SgmlDeclaration(_) => Err(Message::new(
                "Unexpected SGML declaration",
                now,
                RuleId::UnexpectedSgml,
            )),
            SaxEvent::ProcessingInstruction { name, body } => {
                self.enter(ArenaKind::Instruction { name, value: body }, now)?;
                self.exit(now).map(|_| ())
            }
            SaxEvent::Text(value) => self.text(value, now),
            SaxEvent::Comment(value) => {
                self.enter(ArenaKind::Comment(value), now)?;
                let index = self.exit(now)?;
                self.set_end(index, self.config.correction.comment_end(now));
                Ok(())
            }
            SaxEvent::CdataOpen => self.enter(ArenaKind::Cdata(String::new()), now).map(|_| ()),
            SaxEvent::CdataValue(chunk) => match self.top_kind_mut() {
                Some(ArenaKind::Cdata(value)) => {
                    value.push_str(&chunk);
                    Ok(())
                }
                _ => Err(Message::internal(
                    "Received CDATA value without an open CDATA section",
                    now,
                )),
            },
            SaxEvent::CdataClose => match self.top_kind_mut() {
                Some(ArenaKind::Cdata(_)) => self.exit(now).map(|_| ()),
                _ => Err(Message::internal(
                    "Received CDATA close without an open CDATA section",
                    now,
                )),
            },
            SaxEvent::TagOpen { name, attributes } => self
                .enter(ArenaKind::Element { name, attributes }, now)
                .map(|_| ()),
            SaxEvent::TagClose(name) => match self.top_kind_mut() {
                Some(ArenaKind::Element { .. }) => self.exit(now).map(|_| ()),
                _ => Err(Message::internal(
                    format!("Received close tag `{name}` without an open element"),
                    now,
                )),
            },
            SaxEvent::Error(detail) => Err(Message::lexer(&detail, now)),
        }
    }

    fn doctype(&mut self, raw: &str, now: Point) -> Result<(), Message> {
        let start = self.position;
        let decl = parse_doctype(raw).map_err(|err| {
            let point = start.walked("<!DOCTYPE").walked(&raw[..err.index]);
            Message::new(err.reason, point, RuleId::Doctype(err.code))
        })?;
        self.enter(
            ArenaKind::Doctype {
                name: decl.name,
                public: decl.public,
                system: decl.system,
            },
            now,
        )?;
        self.exit(now).map(|_| ())
    }

    fn text(&mut self, value: String, now: Point) -> Result<(), Message> {
        let start = self.position;
        let end = self.config.correction.text_end(start, &value, now);
        self.enter(ArenaKind::Text(value), now)?;
        let index = self.exit(now)?;
        self.arena[index].end = end;
        self.position = self.config.correction.text_cursor(end, now);
        Ok(())
    }

    /// Open a node at the current position as the last child of the top node.
    fn enter(&mut self, kind: ArenaKind, now: Point) -> Result<usize, Message> {
        let Some(&parent) = self.open.last() else {
            return Err(Message::internal("Open-node stack is empty", now));
        };
        let index = self.arena.len();
        self.arena.push(ArenaNode {
            kind,
            start: self.position,
            end: self.position,
            children: Vec::new(),
        });
        self.arena[parent].children.push(index);
        self.open.push(index);
        self.position = now;

        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "xml.tree_builder", "enter #{index} depth={}", self.depth());

        Ok(index)
    }

    /// Close the top node at `now`.
    fn exit(&mut self, now: Point) -> Result<usize, Message> {
        self.position = now;
        if self.open.len() <= 1 {
            return Err(Message::internal("Cannot close the root node", now));
        }
        let Some(index) = self.open.pop() else {
            return Err(Message::internal("Open-node stack is empty", now));
        };
        self.arena[index].end = now;

        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "xml.tree_builder", "exit #{index} depth={}", self.depth());

        Ok(index)
    }

    /// Replace a closed node's end with a corrected one; the cursor follows.
    fn set_end(&mut self, index: usize, end: Point) {
        self.arena[index].end = end;
        self.position = end;
    }

    fn top_kind_mut(&mut self) -> Option<&mut ArenaKind> {
        let index = *self.open.last()?;
        if index == ROOT {
            return None;
        }
        Some(&mut self.arena[index].kind)
    }

    fn into_tree(self) -> Root {
        let mut nodes = self.arena;
        let mut built: Vec<Node> = Vec::with_capacity(nodes.len());

        // Iterative postorder: a node is built after all of its descendants,
        // so its children are the last `children.len()` entries of `built`.
        let mut stack: Vec<(usize, bool)> = nodes[ROOT]
            .children
            .iter()
            .rev()
            .map(|&child| (child, false))
            .collect();

        while let Some((index, visited)) = stack.pop() {
            if !visited {
                stack.push((index, true));
                stack.extend(nodes[index].children.iter().rev().map(|&child| (child, false)));
                continue;
            }

            let node = &mut nodes[index];
            let position = Position::new(node.start, node.end);
            let child_count = node.children.len();
            let built_node = match std::mem::replace(&mut node.kind, ArenaKind::Root) {
                ArenaKind::Element { name, attributes } => Node::Element(Element {
                    name,
                    attributes,
                    children: built.split_off(built.len() - child_count),
                    position,
                }),
                ArenaKind::Text(value) => Node::Text(Text { value, position }),
                ArenaKind::Comment(value) => Node::Comment(Comment { value, position }),
                ArenaKind::Cdata(value) => Node::Cdata(Cdata { value, position }),
                ArenaKind::Doctype {
                    name,
                    public,
                    system,
                } => Node::Doctype(Doctype {
                    name,
                    public,
                    system,
                    position,
                }),
                ArenaKind::Instruction { name, value } => {
                    Node::Instruction(Instruction { name, value, position })
                }
                ArenaKind::Root => continue,
            };
            built.push(built_node);
        }

        Root { children: built }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(TreeBuilderConfig::default())
    }
}

impl EventSink for TreeBuilder {
    fn event(&mut self, event: SaxEvent, now: Point) -> Result<(), Message> {
        self.process(event, now)
    }
}
