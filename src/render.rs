use halo_engines::Grid;

/// Text picture of the grid: `o` alive, `.` dead, each followed by a space.
pub fn render(grid: &Grid) -> String {
    let mut s = String::with_capacity(grid.rows() * (2 * grid.cols() + 1));
    for row in grid.row_iter() {
        for &cell in row {
            s.push(if cell != 0 { 'o' } else { '.' });
            s.push(' ');
        }
        s.push('\n');
    }
    s
}

pub fn print_grid(grid: &Grid) {
    print!("{}", render(grid));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_picture() {
        #[rustfmt::skip]
        let cells = vec![
            0, 1, 1, 1, 0,
            1, 1, 0, 0, 1,
            0, 1, 0, 1, 0,
            0, 0, 0, 0, 0,
            1, 0, 0, 1, 1,
        ];
        let grid = Grid::from_cells(5, 5, cells).unwrap();
        assert_eq!(
            render(&grid),
            ". o o o . \no o . . o \n. o . o . \n. . . . . \no . . o o \n"
        );
    }
}
