pub(crate) fn summary_min_median_max(xs: &[f32]) -> (f32, f32, f32) {
    if xs.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let mut v = xs.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let min = v[0];
    let max = *v.last().unwrap();
    let mid = v.len() / 2;
    let med = if v.len() % 2 == 1 {
        v[mid]
    } else {
        0.5 * (v[mid - 1] + v[mid])
    };
    (min, med, max)
}

pub(crate) fn write_csv(path: &std::path::Path, rows: &[String]) -> std::io::Result<()> {
    use std::io::Write;
    let f = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(f);
    for line in rows {
        writeln!(w, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_odd_list() {
        let (min, med, max) = summary_min_median_max(&[3.0, 1.0, 2.0]);
        assert_eq!((min, med, max), (1.0, 2.0, 3.0));
    }

    #[test]
    fn summary_of_empty_list() {
        assert_eq!(summary_min_median_max(&[]), (0.0, 0.0, 0.0));
    }
}
