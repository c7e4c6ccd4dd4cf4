//! Graphviz export of a network, for eyeballing small cones.
//!
//! Complemented edges are drawn dashed. Dead arena slots are skipped.

use std::io::{self, Write};

use crate::edge::NodeId;
use crate::network::{Network, NodeKind};

pub fn write_dot<W: Write>(network: &Network, w: &mut W) -> io::Result<()> {
    writeln!(w, "digraph aig {{")?;
    writeln!(w, "  rankdir=BT;")?;

    for id in 0..network.num_nodes() as NodeId {
        if network.is_dead(id) {
            continue;
        }
        match network.kind(id) {
            NodeKind::Const => {
                if network.fanout_count(id) > 0 {
                    writeln!(w, "  n{} [label=\"1\", shape=box];", id)?;
                }
            }
            NodeKind::Input(ordinal) => {
                writeln!(w, "  n{} [label=\"x{}\", shape=triangle];", id, ordinal)?;
            }
            NodeKind::And(f0, f1) => {
                writeln!(w, "  n{} [label=\"{}\", shape=circle];", id, id)?;
                for fanin in [f0, f1] {
                    let style = if fanin.is_complement() {
                        ", style=dashed"
                    } else {
                        ""
                    };
                    writeln!(w, "  n{} -> n{} [dir=back{}];", fanin.index(), id, style)?;
                }
            }
        }
    }

    for (i, output) in network.outputs().iter().enumerate() {
        writeln!(w, "  o{} [label=\"y{}\", shape=invtriangle];", i, i)?;
        let style = if output.is_complement() {
            ", style=dashed"
        } else {
            ""
        };
        writeln!(w, "  n{} -> o{} [dir=back{}];", output.index(), i, style)?;
    }

    writeln!(w, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_output_shape() {
        let mut network = Network::new();
        let a = network.add_input();
        let b = network.add_input();
        let f = network.mk_and(a, -b).unwrap();
        network.add_output(-f);
        let mut buffer = Vec::new();
        write_dot(&network, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("digraph aig {"));
        assert!(text.contains("shape=triangle"));
        assert!(text.contains("style=dashed"));
        assert!(text.trim_end().ends_with('}'));
    }
}
