// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::graph::{err::InstanceLoaderError, Graph};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

/// Loads plain-text instances:
///
/// ```text
/// n Q
/// q_1 ... q_n              (pickup demands)
/// d_0 ... d_{2n+1}         (draughts, all nodes)
/// (2n+2) x (2n+2) cost matrix rows; a negative entry forbids the arc
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstanceLoader;

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    pub fn from_bufread<R: BufRead>(&self, mut br: R) -> Result<Graph<i64>, InstanceLoaderError> {
        let mut sc = Scanner::new(&mut br);
        let n = sc.next_i64()?;
        if n <= 0 {
            return Err(InstanceLoaderError::NonPositiveRequestCount);
        }
        let n = n as usize;
        let capacity = sc.next_i64()?;
        let nodes = 2 * n + 2;

        let mut demand = Vec::with_capacity(n);
        for _ in 0..n {
            demand.push(sc.next_i64()?);
        }

        let mut draught = Vec::with_capacity(nodes);
        for _ in 0..nodes {
            draught.push(sc.next_i64()?);
        }

        let mut cost = Vec::with_capacity(nodes);
        for _ in 0..nodes {
            let mut row = Vec::with_capacity(nodes);
            for _ in 0..nodes {
                row.push(sc.next_f64()?);
            }
            cost.push(row);
        }

        Ok(Graph::with_pickup_demands(
            capacity, &demand, cost, draught,
        )?)
    }

    #[inline]
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<Graph<i64>, InstanceLoaderError> {
        let file = File::open(path).map_err(InstanceLoaderError::Io)?;
        self.from_bufread(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(&self, r: R) -> Result<Graph<i64>, InstanceLoaderError> {
        self.from_bufread(BufReader::new(r))
    }

    #[inline]
    pub fn from_str(&self, s: &str) -> Result<Graph<i64>, InstanceLoaderError> {
        self.from_reader(s.as_bytes())
    }
}

#[derive(Debug)]
struct Scanner<R: BufRead> {
    rdr: R,
    buf: String,
    pos: usize,
}

impl<R: BufRead> Scanner<R> {
    fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::new(),
            pos: 0,
        }
    }

    #[inline]
    fn fill_line(&mut self) -> Result<(), InstanceLoaderError> {
        self.buf.clear();
        self.pos = 0;
        let n = self
            .rdr
            .read_line(&mut self.buf)
            .map_err(InstanceLoaderError::Io)?;
        if n == 0 {
            return Err(InstanceLoaderError::UnexpectedEof);
        }
        Ok(())
    }

    #[inline]
    fn skip_ws(&mut self) -> Result<(), InstanceLoaderError> {
        loop {
            if self.pos >= self.buf.len() {
                self.fill_line()?;
                continue;
            }
            while self.pos < self.buf.len() && self.buf.as_bytes()[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.buf.len() {
                continue;
            }
            return Ok(());
        }
    }

    #[inline]
    fn next_token(&mut self) -> Result<&str, InstanceLoaderError> {
        self.skip_ws()?;
        let start = self.pos;
        while self.pos < self.buf.len() && !self.buf.as_bytes()[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        Ok(&self.buf[start..self.pos])
    }

    #[inline]
    fn next_i64(&mut self) -> Result<i64, InstanceLoaderError> {
        self.next_token()?
            .parse::<i64>()
            .map_err(InstanceLoaderError::ParseInt)
    }

    #[inline]
    fn next_f64(&mut self) -> Result<f64, InstanceLoaderError> {
        self.next_token()?
            .parse::<f64>()
            .map_err(InstanceLoaderError::ParseFloat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_OK: &str = r#"
        1 10
        5
        10 10 10 10
        -1 1.0 2.0 3.0
        -1 -1   1.0 2.0
        -1 1.0  -1  1.0
        -1 -1   -1  -1
    "#;

    #[test]
    fn test_loads_minimal_instance() {
        let g = InstanceLoader::new().from_str(SMALL_OK).unwrap();
        assert_eq!(g.n(), 1);
        assert_eq!(g.capacity(), 10);
        assert_eq!(g.demand(1), 5);
        assert_eq!(g.demand(2), -5);
        assert!(g.is_arc(0, 1));
        assert!(!g.is_arc(1, 0));
        assert!(!g.is_arc(3, 2));
        assert_eq!(g.cost(1, 2), 1.0);
    }

    #[test]
    fn test_truncated_instance_reports_eof() {
        let truncated = "2 10\n3 4\n";
        match InstanceLoader::new().from_str(truncated) {
            Err(InstanceLoaderError::UnexpectedEof) => {}
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_token_reports_parse_error() {
        let garbage = "1 ten\n";
        match InstanceLoader::new().from_str(garbage) {
            Err(InstanceLoaderError::ParseInt(_)) => {}
            other => panic!("expected ParseInt, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_instance_reports_graph_error() {
        // Demand 11 exceeds Q = 10.
        let bad = r#"
            1 10
            11
            11 11 11 11
            -1 1 1 1
            -1 -1 1 1
            -1 1 -1 1
            -1 -1 -1 -1
        "#;
        match InstanceLoader::new().from_str(bad) {
            Err(InstanceLoaderError::Graph(_)) => {}
            other => panic!("expected Graph error, got {other:?}"),
        }
    }
}
