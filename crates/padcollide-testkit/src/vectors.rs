//! Golden test vectors for deterministic verification.
//!
//! These pin the exact bytes of specific renderings, their SHA-256 digests,
//! and the first collision found for fixed inputs. Any change to the
//! encoder, the line terminator convention, or the driver's detection order
//! shows up here.

use padcollide::{
    Collider, DigestAlgorithm, Document, MatchKey, PaddingScheme, SearchConfig, SearchOutcome,
};

/// A rendering golden vector.
#[derive(Debug, Clone)]
pub struct RenderVector {
    pub name: &'static str,
    pub lines: &'static [&'static str],
    pub attempt: u64,
    /// Expected rendered text.
    pub rendered: &'static str,
    /// Expected full SHA-256 of `rendered` (hex).
    pub sha256: &'static str,
}

/// A search golden vector.
#[derive(Debug, Clone)]
pub struct CollisionVector {
    pub name: &'static str,
    pub real: &'static [&'static str],
    pub fake: &'static [&'static str],
    pub num_chars: usize,
    /// Attempt index at which the collision is detected.
    pub attempt: u64,
    pub key: &'static str,
    /// Attempt index whose real rendering is reported.
    pub real_source: u64,
    /// Attempt index whose fake rendering is reported.
    pub fake_source: u64,
}

/// All rendering vectors.
pub fn render_vectors() -> Vec<RenderVector> {
    vec![
        RenderVector {
            name: "unpadded two lines",
            lines: &["a", "b"],
            attempt: 0,
            rendered: "a\nb\n",
            sha256: "911169ddaaf146aff539f58c26c489af3b892dff0fe283c1c264c65ae5aa59a2",
        },
        RenderVector {
            name: "both lines at level one",
            lines: &["a", "b"],
            attempt: 3,
            rendered: "a \nb \n",
            sha256: "31aee73e270db78d34554f5ebe5ffda3decea6cc27da019cbeff53cc449f2fe4",
        },
        RenderVector {
            name: "first line at level two",
            lines: &["a", "b"],
            attempt: 5,
            rendered: "a  \nb\n",
            sha256: "9f2e813b5986f8c130d12544d87c621a1d0c12ecb5ab0120c88f448e4e36ab2d",
        },
        RenderVector {
            name: "single line at level one",
            lines: &["x"],
            attempt: 1,
            rendered: "x \n",
            sha256: "0d2d11c63da028b3edee3027aed50c81d332fa4559a2cf821ddd2eb71036669b",
        },
        RenderVector {
            name: "single line at level four",
            lines: &["x"],
            attempt: 7,
            rendered: "x    \n",
            sha256: "aa1d7d8947dd910284467c8b4389df06add958dc197b57d4cb06d4c7ac33d8fc",
        },
        RenderVector {
            name: "letter with lines two and three padded",
            lines: &["Dear Bob,", "I owe you 10 dollars.", "Alice"],
            attempt: 6,
            rendered: "Dear Bob,\nI owe you 10 dollars. \nAlice \n",
            sha256: "2d8ff415740b1968d1b5aae668d67d39549fcdd3e9a21fb0c0f1996df02ec4da",
        },
    ]
}

/// All collision vectors.
pub fn collision_vectors() -> Vec<CollisionVector> {
    vec![
        CollisionVector {
            name: "two hex chars",
            real: &["a", "b"],
            fake: &["x"],
            num_chars: 2,
            attempt: 17,
            key: "2a",
            real_source: 6,
            fake_source: 17,
        },
        CollisionVector {
            name: "three hex chars",
            real: &["a", "b"],
            fake: &["x"],
            num_chars: 3,
            attempt: 153,
            key: "8a4",
            real_source: 46,
            fake_source: 153,
        },
        CollisionVector {
            name: "four hex chars, two-line letters",
            real: &["I owe Bob 10 dollars.", "Signed, Alice"],
            fake: &["I owe Bob 1000 dollars.", "Signed, Alice"],
            num_chars: 4,
            attempt: 259,
            key: "594f",
            real_source: 189,
            fake_source: 259,
        },
    ]
}

/// Check one rendering vector, describing the first mismatch.
pub fn verify_render_vector(vector: &RenderVector) -> Result<(), String> {
    let doc = Document::from_lines(vector.lines.iter().copied());
    let rendered = PaddingScheme::Lines.render(&doc, vector.attempt);
    if rendered.as_str() != vector.rendered {
        return Err(format!(
            "{}: rendered {:?}, expected {:?}",
            vector.name,
            rendered.as_str(),
            vector.rendered
        ));
    }
    let digest = DigestAlgorithm::Sha256.hex_digest(rendered.as_bytes());
    if digest != vector.sha256 {
        return Err(format!(
            "{}: sha256 {}, expected {}",
            vector.name, digest, vector.sha256
        ));
    }
    Ok(())
}

/// Run the search for one collision vector, describing the first mismatch.
pub fn verify_collision_vector(vector: &CollisionVector) -> Result<(), String> {
    let real = Document::from_lines(vector.real.iter().copied());
    let fake = Document::from_lines(vector.fake.iter().copied());
    let config = SearchConfig::new(vector.num_chars);
    let expected_real = PaddingScheme::Lines.render(&real, vector.real_source);
    let expected_fake = PaddingScheme::Lines.render(&fake, vector.fake_source);
    let mut collider = Collider::new(real, fake, &config).map_err(|e| e.to_string())?;

    let collision = match collider.run().map_err(|e| e.to_string())? {
        SearchOutcome::Collision(c) => c,
        other => return Err(format!("{}: no collision: {:?}", vector.name, other)),
    };

    if collision.attempt != vector.attempt || collision.key != MatchKey::new(vector.key) {
        return Err(format!(
            "{}: collision {} at attempt {}, expected {} at {}",
            vector.name, collision.key, collision.attempt, vector.key, vector.attempt
        ));
    }
    if collision.real != expected_real {
        return Err(format!("{}: real variant {:?}", vector.name, collision.real));
    }
    if collision.fake != expected_fake {
        return Err(format!("{}: fake variant {:?}", vector.name, collision.fake));
    }
    if !collision.verify(collider.digest()) {
        return Err(format!("{}: collision does not re-verify", vector.name));
    }
    Ok(())
}

/// Verify every vector, collecting all failures.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let failures: Vec<String> = render_vectors()
        .iter()
        .filter_map(|v| verify_render_vector(v).err())
        .chain(
            collision_vectors()
                .iter()
                .filter_map(|v| verify_collision_vector(v).err()),
        )
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
