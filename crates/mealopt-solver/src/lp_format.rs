//! CPLEX LP text export.

use std::fmt::Write as _;
use std::io;

use crate::problem::{Model, Sense};

const TERMS_PER_LINE: usize = 8;

impl Model {
    /// Render the model in CPLEX LP format
    pub fn to_lp_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\* {} *\\", self.name);

        out.push_str(match self.sense {
            Sense::Minimize => "Minimize\n",
            Sense::Maximize => "Maximize\n",
        });
        let _ = writeln!(out, " obj: {}", self.render_terms(&self.objective));

        out.push_str("Subject To\n");
        for row in &self.rows {
            let _ = writeln!(
                out,
                " {}: {} {} {}",
                row.name,
                self.render_terms(&row.coefficients),
                row.op.symbol(),
                format_number(row.rhs)
            );
        }

        let bounds: Vec<String> = self
            .variables
            .iter()
            .filter_map(|v| match (v.lower, v.upper) {
                (l, u) if l == 0.0 && u == f64::INFINITY => None,
                (l, u) if l == f64::NEG_INFINITY && u == f64::INFINITY => {
                    Some(format!("{} free", v.name))
                }
                (l, u) if l == u => Some(format!("{} = {}", v.name, format_number(l))),
                (l, u) if u == f64::INFINITY => Some(format!("{} >= {}", v.name, format_number(l))),
                (l, u) => Some(format!(
                    "{} <= {} <= {}",
                    format_number(l),
                    v.name,
                    format_number(u)
                )),
            })
            .collect();
        if !bounds.is_empty() {
            out.push_str("Bounds\n");
            for line in bounds {
                let _ = writeln!(out, " {line}");
            }
        }

        let generals: Vec<&str> = self
            .variables
            .iter()
            .filter(|v| v.is_integer())
            .map(|v| v.name.as_str())
            .collect();
        if !generals.is_empty() {
            out.push_str("Generals\n");
            for chunk in generals.chunks(TERMS_PER_LINE) {
                let _ = writeln!(out, " {}", chunk.join(" "));
            }
        }

        out.push_str("End\n");
        out
    }

    /// Write the LP rendering to any byte sink
    pub fn write_lp<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.to_lp_string().as_bytes())
    }

    fn render_terms(&self, coefficients: &[f64]) -> String {
        let mut line = String::new();
        let mut written = 0;
        for (var, &coef) in self.variables.iter().zip(coefficients) {
            if coef == 0.0 {
                continue;
            }
            if written > 0 && written % TERMS_PER_LINE == 0 {
                line.push_str("\n   ");
            }
            let sign = if coef < 0.0 { "-" } else { "+" };
            if written == 0 {
                if coef < 0.0 {
                    line.push_str("- ");
                }
            } else {
                let _ = write!(line, " {sign} ");
            }
            let _ = write!(line, "{} {}", format_number(coef.abs()), var.name);
            written += 1;
        }
        if written == 0 {
            line.push('0');
        }
        line
    }
}

fn format_number(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use crate::problem::{LinearExpr, Variable};
    use crate::ModelBuilder;

    #[test]
    fn test_lp_export_sections() {
        let mut builder = ModelBuilder::new("Meal");
        builder.add_variable(Variable::integer("apple").with_bounds(1.0, 1.0)).unwrap();
        builder.add_variable(Variable::integer("rice").with_lower(1.0)).unwrap();
        builder.add_variable(Variable::continuous("oil")).unwrap();
        builder.add_variable(Variable::continuous("slack").free()).unwrap();
        builder.add_variable(Variable::continuous("beans").with_bounds(0.5, 4.0)).unwrap();
        builder
            .minimize(LinearExpr::new().term("apple", 0.845).term("rice", 0.048).term("oil", 0.111))
            .unwrap();
        builder
            .add_constraint(
                LinearExpr::new()
                    .term("apple", 81.289)
                    .term("rice", 35.812)
                    .ge(700.0)
                    .named("CalorieRequirement"),
            )
            .unwrap();
        builder
            .add_constraint(LinearExpr::new().term("oil", -10.0).term("rice", 1.0).le(24.0))
            .unwrap();
        let lp = builder.build().to_lp_string();

        let expected = "\\* Meal *\\
Minimize
 obj: 0.845 apple + 0.048 rice + 0.111 oil
Subject To
 CalorieRequirement: 81.289 apple + 35.812 rice >= 700
 c1: 1 rice - 10 oil <= 24
Bounds
 apple = 1
 rice >= 1
 slack free
 0.5 <= beans <= 4
Generals
 apple rice
End
";
        assert_eq!(lp, expected);
    }

    #[test]
    fn test_lp_export_empty_objective_and_maximize() {
        let mut builder = ModelBuilder::new("empty");
        builder.add_variable(Variable::continuous("x")).unwrap();
        let lp = builder.build().to_lp_string();
        assert!(lp.contains("Minimize\n obj: 0\n"));
        assert!(!lp.contains("Bounds"));
        assert!(!lp.contains("Generals"));

        let mut builder = ModelBuilder::new("max");
        builder.add_variable(Variable::continuous("x")).unwrap();
        builder.maximize(LinearExpr::new().term("x", -2.0)).unwrap();
        let mut bytes = Vec::new();
        builder.build().write_lp(&mut bytes).unwrap();
        let lp = String::from_utf8(bytes).unwrap();
        assert!(lp.contains("Maximize\n obj: - 2 x\n"));
    }
}
