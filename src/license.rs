pub const NOTICE: &str = "\
searchcode  Copyright (C) 2024  searchcode-rs Contributors
This program comes with ABSOLUTELY NO WARRANTY; for details run `sc license --warranty`.
This is free software, and you are welcome to redistribute it
under certain conditions; run `sc license --conditions` for details.";

pub const TERMS_AND_CONDITIONS: &str = "\
This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

You may convey verbatim copies of the Program's source code as you
receive it, in any medium, provided that you conspicuously and
appropriately publish on each copy an appropriate copyright notice,
keep intact all notices stating that this License applies to the code,
keep intact all notices of the absence of any warranty, and give all
recipients a copy of this License along with the Program.

You may convey a work based on the Program, or the modifications to
produce it from the Program, provided that the work carries prominent
notices stating that you modified it, that it is released under this
License, and that the entire work is licensed as a whole under this
License to anyone who comes into possession of a copy.

You may convey the Program in object code form provided that you also
convey the machine-readable Corresponding Source under the terms of
this License.

The full text of the license is available at
<https://www.gnu.org/licenses/gpl-3.0.html>.";

pub const WARRANTY: &str = "\
THERE IS NO WARRANTY FOR THE PROGRAM, TO THE EXTENT PERMITTED BY
APPLICABLE LAW. EXCEPT WHEN OTHERWISE STATED IN WRITING THE COPYRIGHT
HOLDERS AND/OR OTHER PARTIES PROVIDE THE PROGRAM \"AS IS\" WITHOUT WARRANTY
OF ANY KIND, EITHER EXPRESSED OR IMPLIED, INCLUDING, BUT NOT LIMITED TO,
THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
PURPOSE. THE ENTIRE RISK AS TO THE QUALITY AND PERFORMANCE OF THE PROGRAM
IS WITH YOU. SHOULD THE PROGRAM PROVE DEFECTIVE, YOU ASSUME THE COST OF
ALL NECESSARY SERVICING, REPAIR OR CORRECTION.";
