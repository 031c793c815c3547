//! Dump the tree in graphviz DOT format for inspection.

use crate::index::{IndexType, NodeIndex};
use crate::node::{Color, Node};
use crate::treemap::RbTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

impl<K, V, Ix> RbTreeMap<K, V, Ix>
where
    K: Ord + Debug,
    Ix: IndexType,
{
    /// Write the tree to `path`, labelling each node with its key and value.
    ///
    /// # Errors
    ///
    /// Returns an error when the file can not be created or written.
    #[inline]
    pub fn draw(&self, path: impl AsRef<Path>) -> io::Result<()>
    where
        V: Debug,
    {
        self.draw_with(path, |node| format!("{:?}: {:?}", node.key, node.value))
    }

    /// Write the tree to `path`, labelling each node with its key only.
    ///
    /// # Errors
    ///
    /// Returns an error when the file can not be created or written.
    #[inline]
    pub fn draw_without_value(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.draw_with(path, |node| format!("{:?}", node.key))
    }

    fn draw_with<F>(&self, path: impl AsRef<Path>, label: F) -> io::Result<()>
    where
        F: Fn(&Node<K, V, Ix>) -> String,
    {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "digraph {{")?;
        writeln!(out, "    node [style=filled, fontcolor=white];")?;
        if let Some(root) = self.root {
            self.draw_node(&mut out, root, &label)?;
        }
        writeln!(out, "}}")?;
        out.flush()
    }

    fn draw_node<W, F>(&self, out: &mut W, x: NodeIndex<Ix>, label: &F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&Node<K, V, Ix>) -> String,
    {
        let fill = match self.node_ref(x, Node::color) {
            Color::Red => "red",
            Color::Black => "black",
        };
        let text = self.node_ref(x, |node| label(node)).replace('"', "\\\"");
        writeln!(out, "    n{} [label=\"{}\", fillcolor={}];", x.index(), text, fill)?;
        let children = [self.node_ref(x, Node::left), self.node_ref(x, Node::right)];
        for (slot, child) in children.into_iter().enumerate() {
            match child {
                Some(c) => {
                    writeln!(out, "    n{} -> n{};", x.index(), c.index())?;
                    self.draw_node(out, c, label)?;
                }
                // leaves are invisible points so a lone child still leans left or right
                None => {
                    let nil = format!("nil{}_{}", x.index(), slot);
                    writeln!(out, "    {nil} [shape=point, style=invis];")?;
                    writeln!(out, "    n{} -> {nil} [style=invis];", x.index())?;
                }
            }
        }
        Ok(())
    }
}
