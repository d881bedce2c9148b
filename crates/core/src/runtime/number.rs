//! JS number formatting.

/// `String(n)` for a JS number.
///
/// Uses the shortest round-tripping digits, written out in full for decimal
/// exponents in `-6..21` and in `d.ddde±x` form outside that range.
pub fn number_to_string(n: f64) -> String {
	if n.is_nan() {
		return "NaN".into();
	}
	if n.is_infinite() {
		return if n > 0.0 { "Infinity" } else { "-Infinity" }.into();
	}
	if n == 0.0 {
		return "0".into();
	}

	let sci = format!("{:e}", n.abs());
	let Some((mantissa, exponent)) = sci.split_once('e') else {
		return n.to_string();
	};
	let Ok(exponent) = exponent.parse::<i32>() else {
		return n.to_string();
	};
	let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
	let k = digits.len() as i32;
	// Position of the decimal point relative to the start of `digits`.
	let point = exponent + 1;

	let body = if k <= point && point <= 21 {
		format!("{digits}{}", "0".repeat((point - k) as usize))
	} else if 0 < point && point <= 21 {
		let (int, frac) = digits.split_at(point as usize);
		format!("{int}.{frac}")
	} else if -6 < point && point <= 0 {
		format!("0.{}{digits}", "0".repeat((-point) as usize))
	} else {
		let sign = if exponent < 0 { '-' } else { '+' };
		let (lead, rest) = digits.split_at(1);
		let mantissa = if rest.is_empty() { lead.to_string() } else { format!("{lead}.{rest}") };
		format!("{mantissa}e{sign}{}", exponent.abs())
	};

	if n < 0.0 { format!("-{body}") } else { body }
}

/// Spelling used in `unserializableValue` for numbers JSON cannot carry.
pub fn unserializable(n: f64) -> Option<&'static str> {
	if n.is_nan() {
		Some("NaN")
	} else if n == f64::INFINITY {
		Some("Infinity")
	} else if n == f64::NEG_INFINITY {
		Some("-Infinity")
	} else if n == 0.0 && n.is_sign_negative() {
		Some("-0")
	} else {
		None
	}
}

/// JSON form of a serializable number, using an integer where exact.
pub fn to_json(n: f64) -> Option<serde_json::Value> {
	if unserializable(n).is_some() {
		return None;
	}
	if n.fract() == 0.0 && n.abs() <= 9_007_199_254_740_991.0 {
		return Some(serde_json::Value::from(n as i64));
	}
	serde_json::Number::from_f64(n).map(serde_json::Value::Number)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integers_drop_fraction() {
		assert_eq!(number_to_string(1.0), "1");
		assert_eq!(number_to_string(-42.0), "-42");
		assert_eq!(number_to_string(-0.0), "0");
		assert_eq!(number_to_string(0.5), "0.5");
	}

	#[test]
	fn exponent_form_outside_plain_range() {
		assert_eq!(number_to_string(1e-7), "1e-7");
		assert_eq!(number_to_string(-1.5e-7), "-1.5e-7");
		assert_eq!(number_to_string(0.000001), "0.000001");
		assert_eq!(number_to_string(123.456), "123.456");
		assert_eq!(number_to_string(1e20), "100000000000000000000");
		assert_eq!(number_to_string(1e21), "1e+21");
		assert_eq!(number_to_string(1.2345e25), "1.2345e+25");
		assert_eq!(number_to_string(2f64.powi(60)), "1152921504606847000");
	}

	#[test]
	fn non_finite_spellings() {
		assert_eq!(number_to_string(f64::NAN), "NaN");
		assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
		assert_eq!(unserializable(f64::INFINITY), Some("Infinity"));
		assert_eq!(unserializable(-0.0), Some("-0"));
		assert_eq!(unserializable(0.0), None);
	}

	#[test]
	fn json_prefers_integers() {
		assert_eq!(to_json(3.0), Some(serde_json::json!(3)));
		assert_eq!(to_json(2.5), Some(serde_json::json!(2.5)));
		assert_eq!(to_json(f64::NAN), None);
	}
}
