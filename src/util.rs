use crate::datapoint::Datapoint;
use float_cmp::{approx_eq, F64Margin};
use num::complex::Complex64;

pub fn comp_line(exemplar: &str, calc: &str, test: &str) {
    let mut i: usize = 0;
    let mut exemplar_iter = exemplar.lines();
    let mut calc_iter = calc.lines();
    loop {
        let (exemplar_line, calc_line) = match (exemplar_iter.next(), calc_iter.next()) {
            (None, None) => break,
            (Some(e), Some(c)) => (e, c),
            _ => panic!("test {} number of lines does not match >{}", test, i),
        };
        i += 1;
        assert!(
            exemplar_line == calc_line,
            "test {} line {} does not match\n  exemplar: {}\n      calc: {}",
            test,
            i,
            exemplar_line,
            calc_line
        );
    }
}

pub fn comp_datapoints(exemplar: &[Datapoint], calc: &[Datapoint], precision: F64Margin, test: &str) {
    assert_eq!(exemplar.len(), calc.len(), "test {} length mismatch", test);
    for (i, (e, c)) in exemplar.iter().zip(calc.iter()).enumerate() {
        assert_eq!(
            e.frequency, c.frequency,
            "test {} frequency mismatch at {}",
            test, i
        );
        comp_c64(&e.z(), &c.z(), precision, test, &format!("{}", i));
    }
}

pub fn comp_vec_c64(exemplar: &[Complex64], calc: &[Complex64], precision: F64Margin, test: &str) {
    assert_eq!(exemplar.len(), calc.len(), "test {} length mismatch", test);
    for (i, (e, c)) in exemplar.iter().zip(calc.iter()).enumerate() {
        comp_c64(e, c, precision, test, &format!("{}", i));
    }
}

pub fn comp_vec_f64(exemplar: &[f64], calc: &[f64], precision: F64Margin, test: &str) {
    assert_eq!(exemplar.len(), calc.len(), "test {} length mismatch", test);
    for (i, (e, c)) in exemplar.iter().zip(calc.iter()).enumerate() {
        comp_f64(e, c, precision, test, &format!("{}", i));
    }
}

pub fn comp_c64(
    exemplar: &Complex64,
    calc: &Complex64,
    precision: F64Margin,
    test: &str,
    idx: &str,
) {
    comp_f64(
        &(exemplar.re),
        &(calc.re),
        precision,
        test,
        &(idx.to_owned() + ".re"),
    );
    comp_f64(
        &(exemplar.im),
        &(calc.im),
        precision,
        test,
        &(idx.to_owned() + ".im"),
    );
}

pub fn comp_f64(exemplar: &f64, calc: &f64, precision: F64Margin, test: &str, idx: &str) {
    assert!(
        approx_eq!(f64, *calc, *exemplar, precision),
        " Failed test {} at location {}\n  exemplar: {}\n      calc: {}",
        test,
        idx,
        exemplar,
        calc
    );
}
