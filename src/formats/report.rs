//! Tab separated reports of a computed expected function

use crate::core::{ChromosomeSet, ExpectedValueFunction};
use std::io::{self, Write};

/// Write `distance\texpected` rows of the genome-wide curve
pub fn write_expected_tsv<W: Write>(function: &ExpectedValueFunction, mut out: W) -> io::Result<()> {
    writeln!(
        out,
        "# norm={} unit={} bin_size={}",
        function.norm_type(),
        function.unit(),
        function.bin_size()
    )?;
    writeln!(out, "distance\texpected")?;
    for (distance, value) in function.density().iter().enumerate() {
        writeln!(out, "{}\t{}", distance, value)?;
    }
    out.flush()
}

/// Write `index\tchrom\tscale_factor` rows sorted by chromosome index
pub fn write_scale_factors_tsv<W: Write>(
    function: &ExpectedValueFunction,
    chromosomes: &ChromosomeSet,
    mut out: W,
) -> io::Result<()> {
    let mut factors: Vec<(usize, f64)> = function
        .norm_factors()
        .iter()
        .map(|(&idx, &f)| (idx, f))
        .collect();
    factors.sort_unstable_by_key(|&(idx, _)| idx);

    writeln!(out, "index\tchrom\tscale_factor")?;
    for (idx, factor) in factors {
        let name = chromosomes.get(idx).map_or("?", |c| c.name.as_str());
        writeln!(out, "{}\t{}\t{}", idx, name, factor)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HicUnit, LargeDoubleSequence, NormalizationType};
    use std::collections::HashMap;

    fn test_function() -> ExpectedValueFunction {
        ExpectedValueFunction::new(
            NormalizationType::Vc,
            HicUnit::Bp,
            1000,
            LargeDoubleSequence::from_values(vec![2.5, 1.0]),
            HashMap::from([(2, 0.5), (1, 1.25)]),
        )
    }

    #[test]
    fn test_expected_tsv() {
        let mut buf = Vec::new();
        write_expected_tsv(&test_function(), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "# norm=VC unit=BP bin_size=1000\ndistance\texpected\n0\t2.5\n1\t1\n"
        );
    }

    #[test]
    fn test_scale_factors_tsv_sorted() {
        let set = ChromosomeSet::from_sizes(vec![("chr1", 10), ("chr2", 20)]);
        let mut buf = Vec::new();
        write_scale_factors_tsv(&test_function(), &set, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "index\tchrom\tscale_factor\n1\tchr1\t1.25\n2\tchr2\t0.5\n"
        );
    }
}
